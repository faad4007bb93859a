use std::collections::HashMap;

use serde_derive::{Deserialize, Serialize};

/// Request body shared by the three intent endpoints. Every field is
/// optional at the serde level so a missing field surfaces as the single
/// validation message the clients expect instead of a deserialize reject.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub connected_account_id: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

/// The validated form of [`CreateIntentRequest`].
#[derive(Clone, Debug)]
pub struct IntentParams {
    pub customer_id: String,
    pub total_amount: f64,
    pub connected_account_id: String,
    pub currency: String,
    pub metadata: HashMap<String, String>,
}

impl CreateIntentRequest {
    /// Checks the required fields the way the browser clients rely on:
    /// empty strings and non-positive totals count as missing.
    pub fn validate(&self) -> Option<IntentParams> {
        let customer_id = self.customer_id.as_deref().unwrap_or("").trim();
        let connected_account_id = self.connected_account_id.as_deref().unwrap_or("").trim();
        let total_amount = self.total_amount.unwrap_or(0.0);

        if customer_id.is_empty() || connected_account_id.is_empty() {
            return None;
        }
        if !total_amount.is_finite() || total_amount <= 0.0 {
            return None;
        }

        Some(IntentParams {
            customer_id: customer_id.to_string(),
            total_amount,
            connected_account_id: connected_account_id.to_string(),
            currency: self.currency.clone().unwrap_or_else(|| "zar".to_string()),
            metadata: self.metadata.clone().unwrap_or_default(),
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
    /// Amount charged for this stage, in cents.
    pub amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_fee: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CheckoutPlan {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub plan: Option<CheckoutPlan>,
    #[serde(default)]
    pub success_url: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CheckoutResponse {
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WebhookAck {
    pub received: bool,
}
