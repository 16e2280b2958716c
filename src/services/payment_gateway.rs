use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::PaymentConfig;
use crate::error::AppError;

/// Intention de paiement telle que renvoyée par la passerelle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Crée une intention de paiement de `amount_cents` dans la devise donnée.
    /// Deux appels avec la même `idempotency_key` désignent le même paiement.
    async fn create_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        description: &str,
        idempotency_key: Option<&str>,
    ) -> Result<PaymentIntent, AppError>;
}

/// Passerelle Stripe (API REST /v1/payment_intents)
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: Option<String>,
    api_base: String,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: config.stripe_secret_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        description: &str,
        idempotency_key: Option<&str>,
    ) -> Result<PaymentIntent, AppError> {
        let secret_key = self
            .secret_key
            .as_ref()
            .ok_or_else(|| AppError::PaymentGateway("STRIPE_SECRET_KEY is not configured".into()))?;

        let amount = amount_cents.to_string();
        let params = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("description", description),
            ("automatic_payment_methods[enabled]", "true"),
        ];

        let mut request = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(secret_key)
            .form(&params);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::PaymentGateway(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(AppError::PaymentGateway(message));
        }

        response
            .json::<PaymentIntent>()
            .await
            .map_err(|e| AppError::PaymentGateway(format!("Invalid response: {}", e)))
    }
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::sync::Mutex;

    /// Passerelle de test : renvoie toujours la même intention, ou échoue
    pub struct FakeGateway {
        pub fail: bool,
        pub calls: Mutex<Vec<(i64, String, Option<String>)>>,
    }

    impl FakeGateway {
        pub fn ok() -> Self {
            Self { fail: false, calls: Mutex::new(Vec::new()) }
        }

        pub fn failing() -> Self {
            Self { fail: true, calls: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn create_intent(
            &self,
            amount_cents: i64,
            currency: &str,
            _description: &str,
            idempotency_key: Option<&str>,
        ) -> Result<PaymentIntent, AppError> {
            self.calls
                .lock()
                .unwrap()
                .push((amount_cents, currency.to_string(), idempotency_key.map(str::to_owned)));
            if self.fail {
                return Err(AppError::PaymentGateway("card_declined".into()));
            }
            Ok(PaymentIntent {
                id: "pi_test_123".to_string(),
                client_secret: Some("pi_test_123_secret".to_string()),
                amount: amount_cents,
                currency: currency.to_string(),
                status: "requires_payment_method".to_string(),
            })
        }
    }
}
