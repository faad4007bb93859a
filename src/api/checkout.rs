use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use http::StatusCode;
use log::error;

use crate::api::{bad_request, internal_error, AppState, ErrorMessage};
use crate::models::payment::{CheckoutRequest, CheckoutResponse};
use crate::payments::gateway::CheckoutParams;

const DEFAULT_SUCCESS_URL: &str = "http://localhost:8081/dashboard";
const DEFAULT_CANCEL_URL: &str = "http://localhost:8081/pricing";
const CHECKOUT_CURRENCY: &str = "zar";

/// Hosted checkout for subscription plans. Plan prices arrive as display
/// strings like "R299" and are reduced to their digits.
pub async fn post_checkout_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, (StatusCode, Json<ErrorMessage>)> {
    let plan = match request.plan {
        Some(plan) => plan,
        None => return Err(bad_request("Plan information required")),
    };
    let price = plan.price.as_deref().unwrap_or("");
    if price.is_empty() {
        return Err(bad_request("Plan information required"));
    }

    let amount_cents = plan_price_cents(price);
    if amount_cents == 0 {
        return Err(bad_request("Invalid plan price"));
    }

    let params = CheckoutParams {
        product_name: format!("{} Plan", plan.name),
        amount_cents,
        currency: CHECKOUT_CURRENCY.to_string(),
        success_url: request
            .success_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_SUCCESS_URL.to_string()),
        cancel_url: request
            .cancel_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_CANCEL_URL.to_string()),
    };

    match state.gateway.create_checkout_session(params).await {
        Ok(session) => Ok(Json(CheckoutResponse { url: session.url })),
        Err(err) => {
            error!("Failed to create checkout session: {}", err);
            Err(internal_error("Failed to create checkout session"))
        }
    }
}

/// "R299" -> 29900. Anything without digits comes out as zero.
fn plan_price_cents(price: &str) -> u64 {
    let digits: String = price.chars().filter(|c| c.is_ascii_digit()).collect();

    digits
        .parse::<u64>()
        .ok()
        .and_then(|units| units.checked_mul(100))
        .unwrap_or(0)
}
