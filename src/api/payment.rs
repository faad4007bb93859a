use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use http::StatusCode;
use log::error;

use crate::api::{bad_request, internal_error, AppState, ErrorMessage};
use crate::models::payment::{CreateIntentRequest, IntentResponse};
use crate::payments::gateway::IntentCharge;
use crate::payments::split::{BookingSplit, PaymentStage};

const MISSING_FIELDS: &str = "customerId, totalAmount and connectedAccountId are required";

/// 20% deposit, charged when the booking is placed. No platform fee on
/// this leg.
pub async fn post_booking_intent(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<Json<IntentResponse>, (StatusCode, Json<ErrorMessage>)> {
    create_stage_intent(
        state,
        request,
        PaymentStage::BookingDeposit,
        "Failed to create booking payment intent",
    )
    .await
}

/// Remaining 80%, charged after the service. Carries the platform fee,
/// which is 5% of the full total.
pub async fn post_completion_intent(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<Json<IntentResponse>, (StatusCode, Json<ErrorMessage>)> {
    create_stage_intent(
        state,
        request,
        PaymentStage::Completion,
        "Failed to create completion payment intent",
    )
    .await
}

/// 30% cancellation fee, with a 5% platform fee on the fee itself.
pub async fn post_cancellation_intent(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<Json<IntentResponse>, (StatusCode, Json<ErrorMessage>)> {
    create_stage_intent(
        state,
        request,
        PaymentStage::Cancellation,
        "Failed to create cancellation payment intent",
    )
    .await
}

async fn create_stage_intent(
    state: Arc<AppState>,
    request: CreateIntentRequest,
    stage: PaymentStage,
    failure_message: &'static str,
) -> Result<Json<IntentResponse>, (StatusCode, Json<ErrorMessage>)> {
    let params = match request.validate() {
        Some(params) => params,
        None => return Err(bad_request(MISSING_FIELDS)),
    };

    let split = BookingSplit::from_amount(params.total_amount);
    let amount = split.stage_amount(stage);
    let application_fee = split.stage_fee(stage);

    let mut metadata = HashMap::new();
    metadata.insert("stage".to_string(), stage.tag().to_string());
    if let Some(fee) = application_fee {
        metadata.insert("application_fee".to_string(), fee.to_string());
    }
    // Caller-supplied metadata wins on key collisions.
    metadata.extend(params.metadata);

    let charge = IntentCharge {
        amount_cents: amount,
        currency: params.currency,
        customer_id: params.customer_id,
        connected_account_id: params.connected_account_id,
        application_fee_cents: application_fee,
        metadata,
    };

    match state.gateway.create_payment_intent(charge).await {
        Ok(intent) => Ok(Json(IntentResponse {
            client_secret: intent.client_secret,
            payment_intent_id: intent.id,
            amount,
            application_fee,
        })),
        Err(err) => {
            error!("{}: {}", failure_message, err);
            Err(internal_error(failure_message))
        }
    }
}
