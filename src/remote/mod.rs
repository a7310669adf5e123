//! Remote persistence: an HTTP document store holding the whole checklist as
//! one document, plus the local cache remembering which document is ours.

pub mod cache;
pub mod client;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::TreeNode;

/// Remote persistence errors.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: API key required or invalid")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),

    #[error("No remote document has been opened yet")]
    NoDocument,

    #[error("Document id cache: {0}")]
    Cache(String),
}

/// The persisted document body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistDocument {
    pub items: Vec<TreeNode>,
}

/// Outcome of a remote operation, delivered back to the event loop.
#[derive(Debug)]
pub enum RemoteEvent {
    /// The document was fetched; replaces the whole canonical tree.
    Loaded(Vec<TreeNode>),
    /// A full-document replace succeeded.
    Saved,
    /// A create, fetch or replace failed. Non-fatal.
    Failed { op: RemoteOp, message: String },
}

/// Which remote operation an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOp {
    Create,
    Fetch,
    Replace,
}

impl RemoteOp {
    pub fn label(&self) -> &'static str {
        match self {
            RemoteOp::Create => "create",
            RemoteOp::Fetch => "fetch",
            RemoteOp::Replace => "save",
        }
    }
}
