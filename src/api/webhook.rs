use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use http::{HeaderMap, StatusCode};
use log::{debug, error, info, warn};

use crate::api::AppState;
use crate::models::notification::{NewNotification, NotificationKind};
use crate::models::payment::WebhookAck;
use crate::models::webhook::{PaymentIntentObject, WebhookEvent};
use crate::payments::signature::{self, SIGNATURE_HEADER};
use crate::payments::split::PaymentStage;

/// Provider callback. The body must stay raw until the signature check has
/// passed; without a configured secret the check is skipped entirely.
pub async fn post_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, (StatusCode, String)> {
    if let Some(secret) = &state.webhook_secret {
        let header = headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        if let Err(err) = signature::verify(&body, header, secret, Utc::now().timestamp()) {
            error!("Webhook signature verification failed: {}", err);
            return Err((StatusCode::BAD_REQUEST, format!("Webhook Error: {}", err)));
        }
    } else {
        warn!("STRIPE_WEBHOOK_SECRET not set, skipping signature verification (NOT recommended in production)");
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            error!("Webhook body could not be parsed: {}", err);
            return Err((StatusCode::BAD_REQUEST, format!("Webhook Error: {}", err)));
        }
    };

    dispatch_event(&state, event).await;

    Ok(Json(WebhookAck { received: true }))
}

async fn dispatch_event(state: &Arc<AppState>, event: WebhookEvent) {
    match event.kind.as_str() {
        "payment_intent.succeeded" => {
            let intent: PaymentIntentObject = match serde_json::from_value(event.data.object) {
                Ok(intent) => intent,
                Err(err) => {
                    warn!("Malformed payment_intent.succeeded payload: {}", err);
                    return;
                }
            };

            info!(
                "PaymentIntent succeeded: {}, metadata: {:?}",
                intent.id, intent.metadata
            );

            publish(
                state,
                NewNotification {
                    title: "Payment Received".to_string(),
                    message: succeeded_message(&intent),
                    kind: NotificationKind::Success,
                    action_url: None,
                },
            )
            .await;
        }
        "payment_intent.payment_failed" => {
            info!("Payment failed: {}", event.data.object);

            let id = event
                .data
                .object
                .get("id")
                .and_then(|value| value.as_str())
                .unwrap_or("unknown");

            publish(
                state,
                NewNotification {
                    title: "Payment Failed".to_string(),
                    message: format!("Payment {} failed", id),
                    kind: NotificationKind::Error,
                    action_url: None,
                },
            )
            .await;
        }
        other => debug!("Unhandled event type {}", other),
    }
}

fn succeeded_message(intent: &PaymentIntentObject) -> String {
    let stage = intent
        .metadata
        .get("stage")
        .and_then(|tag| PaymentStage::from_tag(tag));

    let phrase = match stage {
        Some(PaymentStage::BookingDeposit) => "Booking deposit received",
        Some(PaymentStage::Completion) => "Completion payment received",
        Some(PaymentStage::Cancellation) => "Cancellation fee received",
        None => "Payment received",
    };

    format!("{} ({})", phrase, intent.id)
}

async fn publish(state: &Arc<AppState>, new: NewNotification) {
    let notification = state.notifications.lock().await.add(new);
    // Nobody listening is fine.
    let _ = state.tx.send(notification);
}
