use std::sync::Arc;

use axum::{extract::{
    State,
    ws::WebSocketUpgrade,
}, Json, response::IntoResponse, Router, routing::get};
use axum::routing::{delete, post, put};
use http::StatusCode;
use log::{error, info};
use serde_derive::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::api::checkout::post_checkout_session;
use crate::api::info::get_info;
use crate::api::notifications::{
    delete_all_notifications, delete_notification, get_notifications, post_notification,
    put_all_notifications_read, put_notification_read,
};
use crate::api::payment::{post_booking_intent, post_cancellation_intent, post_completion_intent};
use crate::api::webhook::post_webhook;
use crate::config::ServerConf;
use crate::handlers::connection_handler::handle_connection;
use crate::models::notification::Notification;
use crate::notifications::NotificationCenter;
use crate::payments::gateway::PaymentGateway;

mod checkout;
mod info;
mod notifications;
mod payment;
mod webhook;

pub struct AppState {
    pub gateway: Arc<dyn PaymentGateway>,
    pub notifications: Mutex<NotificationCenter>,
    pub tx: broadcast::Sender<Notification>,
    pub webhook_secret: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ErrorMessage {
    pub error: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/", get(get_info))
        .route("/create-checkout-session", post(post_checkout_session))
        .route("/payment/booking-intent", post(post_booking_intent))
        .route("/payment/completion-intent", post(post_completion_intent))
        .route("/payment/cancellation-intent", post(post_cancellation_intent))
        .route("/webhook", post(post_webhook))
        .route("/notifications", get(get_notifications))
        .route("/notifications", post(post_notification))
        .route("/notifications", delete(delete_all_notifications))
        .route("/notifications/read-all", put(put_all_notifications_read))
        .route("/notifications/:id/read", put(put_notification_read))
        .route("/notifications/:id", delete(delete_notification))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(conf: &ServerConf, state: Arc<AppState>) {
    let address = format!("{}:{}", conf.address, conf.port);

    let app = router(state);

    let try_socket = TcpListener::bind(&address).await;

    let listener = try_socket.expect("Failed to bind");
    info!("Listening on: {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
    }
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_connection(socket, state))
}

pub fn bad_request(message: &str) -> (StatusCode, Json<ErrorMessage>) {
    (StatusCode::BAD_REQUEST, Json(ErrorMessage { error: message.to_string() }))
}

pub fn internal_error(message: &str) -> (StatusCode, Json<ErrorMessage>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorMessage { error: message.to_string() }))
}
