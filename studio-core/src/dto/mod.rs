//! Data Transfer Objects for the image-generation API
//!
//! Request bodies sent to the API and the response shapes it returns.
//! Responses are sometimes wrapped as `{ "data": ... }`; [`Envelope`]
//! accepts both forms.

pub mod asset;
pub mod auth;
pub mod generation;
pub mod payment;

use serde::{Deserialize, Serialize};

/// A response body that may or may not be wrapped in a `data` field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } | Envelope::Bare(data) => data,
        }
    }
}
