use crate::{chunk_ids, merge_node_responses, ApiConfig, DesignApi, RemoteError, NODE_CHUNK_SIZE};
use serde_json::Value;
use std::io::Read;
use std::time::{Duration, Instant};

/// `DesignApi` over HTTPS.
///
/// Issues plain `GET` requests:
/// - `GET {base}/files/{file_id}/styles`
/// - `GET {base}/files/{file_id}/components`
/// - `GET {base}/files/{file_id}/nodes?ids=a,b,c`
///
/// The token, when configured, goes in the `X-Figma-Token` header. No request
/// is retried.
pub struct HttpDesignApi {
    config: ApiConfig,
    agent: ureq::Agent,
}

impl HttpDesignApi {
    pub fn new(config: ApiConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();
        Self {
            config,
            agent: agent_config.into(),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn file_url(&self, endpoint: &str) -> String {
        format!(
            "{}/files/{}/{endpoint}",
            self.config.base_url, self.config.file_id
        )
    }

    fn do_get(&self, url: &str) -> Result<Value, RemoteError> {
        let mut req = self
            .agent
            .get(url)
            .header("Content-Type", "application/json");
        if let Some(ref token) = self.config.token {
            req = req.header("X-Figma-Token", token);
        }

        let started = Instant::now();
        let resp = match req.call() {
            Ok(r) => r,
            Err(ureq::Error::StatusCode(404)) => {
                return Err(RemoteError::NotFound(url.to_owned()));
            }
            Err(ureq::Error::StatusCode(code)) => {
                return Err(RemoteError::Http(format!("HTTP {code} for {url}")));
            }
            Err(e) => {
                return Err(RemoteError::Http(e.to_string()));
            }
        };
        tracing::debug!("GET {url} took {} ms", started.elapsed().as_millis());

        let mut reader = resp.into_body().into_reader();
        let mut body = Vec::new();
        reader
            .read_to_end(&mut body)
            .map_err(|e| RemoteError::Http(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| RemoteError::Serialization(e.to_string()))
    }
}

impl DesignApi for HttpDesignApi {
    fn get_styles(&self) -> Result<Value, RemoteError> {
        self.do_get(&self.file_url("styles"))
    }

    fn get_components(&self) -> Result<Value, RemoteError> {
        self.do_get(&self.file_url("components"))
    }

    fn get_nodes(&self, ids: &[String]) -> Result<Value, RemoteError> {
        let base = self.file_url("nodes");
        let mut responses = Vec::new();
        for chunk in chunk_ids(ids, NODE_CHUNK_SIZE) {
            let url = format!("{base}?ids={}", chunk.join(","));
            responses.push(self.do_get(&url)?);
        }
        tracing::debug!("fetched {} nodes in {} requests", ids.len(), responses.len());
        Ok(merge_node_responses(responses))
    }
}
