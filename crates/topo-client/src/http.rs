//! HTTP coordination service client
//!
//! Fetches serving keyspace documents from the coordination service's
//! RESTful API

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use topo_core::{Result, TopoError, TopoServer};

/// Response envelope of the coordination service API
#[derive(Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

/// Coordination service client over HTTP
pub struct HttpTopoServer {
    addr: String,
    base_url: Url,
    http_client: reqwest::Client,
}

impl HttpTopoServer {
    /// Create a client for the service at `addr` (e.g. `http://127.0.0.1:15000`)
    pub fn new(addr: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TopoError::Connection(format!("failed to create HTTP client: {e}")))?;

        let addr = addr.into().trim_end_matches('/').to_string();
        let base_url = Url::parse(&addr)
            .map_err(|e| TopoError::Connection(format!("invalid address {addr}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(TopoError::Connection(format!("invalid address {addr}")));
        }

        Ok(Self {
            addr,
            base_url,
            http_client,
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Cell and keyspace are percent-encoded as single path segments
    fn srv_keyspace_url(&self, cell: &str, keyspace: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "v1", "cells", cell, "keyspaces", keyspace]);
        }
        url
    }
}

#[async_trait]
impl TopoServer for HttpTopoServer {
    async fn get_srv_keyspace(&self, cell: &str, keyspace: &str) -> Result<Value> {
        let url = self.srv_keyspace_url(cell, keyspace);

        let resp = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TopoError::Connection(format!("GET {url}: {e}")))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(TopoError::NotFound {
                cell: cell.to_string(),
                keyspace: keyspace.to_string(),
            });
        }

        let body: ApiResponse<Value> = resp
            .json()
            .await
            .map_err(|e| TopoError::Connection(format!("invalid response from {url}: {e}")))?;

        if body.success {
            debug!("Fetched serving keyspace {} from cell {}", keyspace, cell);
            Ok(body.data.unwrap_or(Value::Null))
        } else {
            Err(TopoError::Connection(body.error.unwrap_or_default()))
        }
    }
}
