//! Payment DTOs

use serde::{Deserialize, Serialize};

/// Body of the checkout request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub bundle_id: i64,
}
