//! Read-only client for the design tool's REST API.
//!
//! The token engine never talks to the network itself; this crate is the
//! collaborator that fetches file styles, components, and node documents as
//! raw JSON. `DesignApi` is the seam, `HttpDesignApi` the ureq-backed
//! implementation, and `ApiConfig` holds the endpoint, file id, and token.

pub mod config;
pub mod http;

pub use config::{ApiConfig, DEFAULT_BASE_URL, TOKEN_ENV_VAR};
pub use http::HttpDesignApi;

use serde_json::{Map, Value};
use thiserror::Error;

/// Maximum number of node ids sent in one `nodes` request.
pub const NODE_CHUNK_SIZE: usize = 50;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("API config error: {0}")]
    Config(String),
}

/// Endpoints of the design tool the generators may need.
///
/// Each call returns the decoded JSON body as is.
pub trait DesignApi: Send + Sync {
    fn get_styles(&self) -> Result<Value, RemoteError>;

    fn get_components(&self) -> Result<Value, RemoteError>;

    /// Fetch node documents by id. Implementations may split the request;
    /// the returned `nodes` map holds every requested node that exists.
    fn get_nodes(&self, ids: &[String]) -> Result<Value, RemoteError>;
}

/// Split ids into request-sized chunks.
pub fn chunk_ids(ids: &[String], size: usize) -> Vec<&[String]> {
    ids.chunks(size.max(1)).collect()
}

/// Fold several `nodes` responses into one.
///
/// The first response supplies every other field; the `nodes` maps are
/// merged with later responses winning on duplicate ids.
pub fn merge_node_responses(responses: Vec<Value>) -> Value {
    let mut nodes = Map::new();
    let mut base = Map::new();

    for (index, response) in responses.into_iter().enumerate() {
        let Value::Object(mut object) = response else {
            continue;
        };
        if let Some(Value::Object(chunk)) = object.remove("nodes") {
            nodes.extend(chunk);
        }
        if index == 0 {
            base = object;
        }
    }

    base.insert("nodes".to_owned(), Value::Object(nodes));
    Value::Object(base)
}
