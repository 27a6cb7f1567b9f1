#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

use topo_core::{Result, TopoError, TopoServer};

type ErrorFactory = Box<dyn Fn() -> TopoError + Send + Sync>;

enum Reply {
    Document(Value),
    Fail(ErrorFactory),
}

/// In-memory coordination service that records every request
#[derive(Default)]
pub struct MockTopoServer {
    replies: HashMap<(String, String), Reply>,
    requests: Mutex<Vec<(String, String)>>,
}

impl MockTopoServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, cell: &str, keyspace: &str, doc: Value) -> Self {
        self.replies
            .insert((cell.to_string(), keyspace.to_string()), Reply::Document(doc));
        self
    }

    pub fn with_error<F>(mut self, cell: &str, keyspace: &str, make: F) -> Self
    where
        F: Fn() -> TopoError + Send + Sync + 'static,
    {
        self.replies
            .insert((cell.to_string(), keyspace.to_string()), Reply::Fail(Box::new(make)));
        self
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TopoServer for MockTopoServer {
    async fn get_srv_keyspace(&self, cell: &str, keyspace: &str) -> Result<Value> {
        self.requests
            .lock()
            .unwrap()
            .push((cell.to_string(), keyspace.to_string()));

        match self.replies.get(&(cell.to_string(), keyspace.to_string())) {
            Some(Reply::Document(doc)) => Ok(doc.clone()),
            Some(Reply::Fail(make)) => Err(make()),
            None => Err(TopoError::NotFound {
                cell: cell.to_string(),
                keyspace: keyspace.to_string(),
            }),
        }
    }
}

/// Two-way split at the midpoint for `master`, unsharded `replica`
pub fn user_keyspace_document() -> Value {
    json!({
        "TabletTypes": ["master", "replica", "rdonly"],
        "Partitions": {
            "master": {"Shards": [
                {"KeyRange": {"Start": "", "End": "80000000"}},
                {"KeyRange": {"Start": "80000000", "End": ""}}
            ]},
            "replica": {"Shards": [
                {"KeyRange": {"Start": "", "End": ""}}
            ]}
        },
        "ShardingColumnName": "keyspace_id",
        "ShardingColumnType": "uint64"
    })
}

/// Document with `count` equally sized shards split on the first two bytes
pub fn uniform_keyspace_document(count: u32) -> Value {
    assert!((1..=0x10000).contains(&count));
    let bound = |i: u32| -> String {
        if i == 0 || i == count {
            String::new()
        } else {
            format!("{:04X}", u64::from(i) * 0x10000 / u64::from(count))
        }
    };
    let shards: Vec<Value> = (0..count)
        .map(|i| json!({"KeyRange": {"Start": bound(i), "End": bound(i + 1)}}))
        .collect();

    json!({
        "TabletTypes": ["master"],
        "Partitions": {"master": {"Shards": shards}},
        "ShardingColumnName": "keyspace_id",
        "ShardingColumnType": "uint64"
    })
}
