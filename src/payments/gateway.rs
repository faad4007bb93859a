//! Outbound port to the payment provider. Handlers talk to the
//! [`PaymentGateway`] trait; the production implementation calls the
//! Stripe REST API with form-encoded bodies.

use std::collections::HashMap;

use async_trait::async_trait;
use http::StatusCode;
use serde_derive::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider rejected the request: {0}")]
    Provider(String),
}

/// One payment-intent creation call. The caller has already computed the
/// stage amount and fee and filled the metadata (stage tag included).
#[derive(Clone, Debug)]
pub struct IntentCharge {
    pub amount_cents: u64,
    pub currency: String,
    pub customer_id: String,
    pub connected_account_id: String,
    pub application_fee_cents: Option<u64>,
    pub metadata: HashMap<String, String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GatewayIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Clone, Debug)]
pub struct CheckoutParams {
    pub product_name: String,
    pub amount_cents: u64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GatewayCheckout {
    pub url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        charge: IntentCharge,
    ) -> Result<GatewayIntent, GatewayError>;

    async fn create_checkout_session(
        &self,
        params: CheckoutParams,
    ) -> Result<GatewayCheckout, GatewayError>;
}

pub struct StripeGateway {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeGateway {
    /// `api_base` comes from config, which owns the production default;
    /// tests point it at a local stub server.
    pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        StripeGateway {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
            api_base: api_base.into(),
        }
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, GatewayError> {
        let response = self
            .http
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Provider(provider_error(status, &body)));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        charge: IntentCharge,
    ) -> Result<GatewayIntent, GatewayError> {
        let mut form: Vec<(String, String)> = vec![
            ("amount".to_string(), charge.amount_cents.to_string()),
            ("currency".to_string(), charge.currency.clone()),
            ("customer".to_string(), charge.customer_id.clone()),
            ("payment_method_types[]".to_string(), "card".to_string()),
            (
                "transfer_data[destination]".to_string(),
                charge.connected_account_id.clone(),
            ),
        ];

        if let Some(fee) = charge.application_fee_cents {
            form.push(("application_fee_amount".to_string(), fee.to_string()));
        }
        for (key, value) in &charge.metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }

        self.post_form("/payment_intents", &form).await
    }

    async fn create_checkout_session(
        &self,
        params: CheckoutParams,
    ) -> Result<GatewayCheckout, GatewayError> {
        let form: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[]".to_string(), "card".to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                params.currency.clone(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                params.product_name.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                params.amount_cents.to_string(),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("success_url".to_string(), params.success_url.clone()),
            ("cancel_url".to_string(), params.cancel_url.clone()),
        ];

        self.post_form("/checkout/sessions", &form).await
    }
}

/// Prefer the provider's own error message; fall back to status plus body.
fn provider_error(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        #[serde(default)]
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
        _ => format!("HTTP {status}: {body}"),
    }
}
