//! Data models for the Change Analysis API.
//!
//! The backend schema is open-ended, so records stay untyped JSON
//! documents. This module holds the document helpers and the query
//! filter builder shared by every collection.

mod document;
mod filters;

pub use document::*;
pub use filters::*;
