//! Payment endpoints

use crate::error::Result;
use crate::{AUTH_TIMEOUT, LEDGER_TIMEOUT, StudioClient};
use studio_core::domain::credits::{Bundle, BundleList, Checkout, PaymentStatus};
use studio_core::dto::payment::CheckoutRequest;

impl StudioClient {
    /// List the purchasable credit bundles
    ///
    /// This endpoint does not require authentication.
    pub async fn bundles(&self) -> Result<Vec<Bundle>> {
        let url = self.url("/api/v1/payments/bundles");
        let response = self.client.get(&url).timeout(LEDGER_TIMEOUT).send().await?;

        let list: BundleList = self.handle_response(response).await?;
        Ok(list.bundles)
    }

    /// Start a checkout for a bundle
    ///
    /// # Returns
    /// The checkout session including the payment page URL
    pub async fn checkout(&self, bundle_id: i64) -> Result<Checkout> {
        let url = self.url("/api/v1/payments/checkout");
        let body = CheckoutRequest { bundle_id };
        self.authed_json(|c| c.post(&url).timeout(AUTH_TIMEOUT).json(&body))
            .await
    }

    /// Get the status of a payment
    pub async fn payment_status(&self, payment_id: i64) -> Result<PaymentStatus> {
        let url = self.url(&format!("/api/v1/payments/status/{}", payment_id));
        self.authed_json(|c| c.get(&url).timeout(LEDGER_TIMEOUT)).await
    }
}

#[cfg(test)]
mod tests {
    use crate::{Credentials, StudioClient};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_bundles_nested_in_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/payments/bundles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"bundles": [{"id": 1, "name": "Starter", "credits": 500, "price_in_usd": 5.0}]}
            })))
            .mount(&server)
            .await;

        let bundles = StudioClient::new(server.uri()).bundles().await.expect("bundles");
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].display_name(), "Starter");
    }

    #[tokio::test]
    async fn test_checkout_posts_bundle_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/payments/checkout"))
            .and(body_json(serde_json::json!({"bundle_id": 3})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "payment_id": 11, "payment_url": "https://checkout.example/pay/11"
            })))
            .mount(&server)
            .await;

        let client = StudioClient::new(server.uri()).with_credentials(Credentials {
            access_token: Some("tok".into()),
            ..Default::default()
        });
        let checkout = client.checkout(3).await.expect("checkout");
        assert_eq!(checkout.payment_id, Some(11));
        assert_eq!(checkout.payment_url(), Some("https://checkout.example/pay/11"));
    }

    #[tokio::test]
    async fn test_payment_status_wrapped_and_bare() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/payments/status/11"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"payment_id": 11, "status": "completed", "credits": 500}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/payments/status/12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "payment_id": 12, "status": "pending"
            })))
            .mount(&server)
            .await;

        let client = StudioClient::new(server.uri()).with_credentials(Credentials {
            access_token: Some("tok".into()),
            ..Default::default()
        });

        let paid = client.payment_status(11).await.expect("wrapped status");
        assert_eq!(paid.payment_id, Some(11));
        assert_eq!(paid.status.as_deref(), Some("completed"));
        assert_eq!(paid.credits, Some(500));

        let pending = client.payment_status(12).await.expect("bare status");
        assert_eq!(pending.payment_id, Some(12));
        assert_eq!(pending.status.as_deref(), Some("pending"));
        assert_eq!(pending.credits, None);
    }
}
