//! Credit ledger endpoints

use crate::error::Result;
use crate::{LEDGER_TIMEOUT, StudioClient};
use studio_core::domain::credits::{Balance, PricingEntry, PricingList, TransactionPage};

/// Default page size for transaction listings
pub const DEFAULT_TRANSACTION_LIMIT: u32 = 50;

impl StudioClient {
    /// Get the current credit balance
    pub async fn balance(&self) -> Result<Balance> {
        let url = self.url("/api/v1/credits/balance");
        self.authed_json(|c| c.get(&url).timeout(LEDGER_TIMEOUT)).await
    }

    /// Get the price list of the generation endpoints
    ///
    /// This endpoint does not require authentication.
    pub async fn pricing(&self) -> Result<Vec<PricingEntry>> {
        let url = self.url("/api/v1/credits/pricing");
        let response = self.client.get(&url).timeout(LEDGER_TIMEOUT).send().await?;

        let pricing: PricingList = self.handle_response(response).await?;
        Ok(pricing.into_entries())
    }

    /// Get one page of the credit transaction history
    ///
    /// # Arguments
    /// * `page` - Page number, starting at 1
    /// * `limit` - Entries per page
    pub async fn transactions(&self, page: u32, limit: u32) -> Result<TransactionPage> {
        let url = self.url("/api/v1/credits/transactions");
        self.authed_json(|c| {
            c.get(&url)
                .timeout(LEDGER_TIMEOUT)
                .query(&[("page", page), ("limit", limit)])
        })
        .await
    }
}
