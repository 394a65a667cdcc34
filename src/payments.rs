use crate::error::AppError;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{Arc, Mutex};

/// PaymentIntent
///
/// The slice of a provider payment intent the API needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

// 1. PaymentGateway Contract
/// PaymentGateway
///
/// Abstract contract with the external payment provider. Handlers depend on the
/// trait, so production uses `StripeGateway` and tests use `MockPaymentGateway`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a card-only payment intent for `amount` minor units of `currency`.
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, AppError>;
}

/// Converts a decimal price to minor units by truncation: 19.999 becomes 1999.
pub fn amount_in_cents(price: f64) -> Result<i64, AppError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::BadRequest(format!("invalid price: {price}")));
    }
    Ok((price * 100.0).trunc() as i64)
}

// 2. The Real Implementation (Stripe REST API)
/// StripeGateway
///
/// Talks to `POST {base}/v1/payment_intents` with the secret key as bearer auth.
#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(api_base: &str, secret_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, AppError> {
        let url = format!("{}/v1/payment_intents", self.api_base);
        let form = [
            ("amount", amount.to_string()),
            ("currency", currency.to_string()),
            ("payment_method_types[]", "card".to_string()),
        ];

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "payment provider answered {status}: {body}"
            )));
        }

        let intent = response.json::<PaymentIntent>().await?;
        tracing::info!(intent_id = %intent.id, amount, currency, "payment intent created");
        Ok(intent)
    }
}

// 3. The Mock Implementation (For Tests)
/// MockPaymentGateway
///
/// Records every requested amount and answers with a deterministic client secret.
#[derive(Clone, Default)]
pub struct MockPaymentGateway {
    /// When true, every call fails as if the provider were down.
    pub should_fail: bool,
    requests: Arc<Mutex<Vec<(i64, String)>>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// `(amount, currency)` of every intent requested so far.
    pub fn requests(&self) -> Vec<(i64, String)> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, AppError> {
        if self.should_fail {
            return Err(AppError::Upstream(
                "mock payment provider: simulated outage".to_string(),
            ));
        }

        if let Ok(mut requests) = self.requests.lock() {
            requests.push((amount, currency.to_string()));
        }

        Ok(PaymentIntent {
            id: format!("pi_mock_{amount}"),
            client_secret: format!("pi_mock_{amount}_secret_{currency}"),
        })
    }
}

/// PaymentState
///
/// The concrete type used to share the payment gateway across the application state.
pub type PaymentState = Arc<dyn PaymentGateway>;
