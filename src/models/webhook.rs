use std::collections::HashMap;

use serde_derive::Deserialize;

/// Incoming provider event, parsed from the raw webhook body after the
/// signature check. Only the fields the dispatcher looks at are typed;
/// the payload object stays a `Value` until the event type is known.
#[derive(Deserialize, Clone, Debug)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: WebhookEventData,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct WebhookEventData {
    #[serde(default)]
    pub object: serde_json::Value,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PaymentIntentObject {
    pub id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}
