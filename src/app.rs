use std::sync::Arc;

use log::info;
use tokio::sync::broadcast;
use tokio::sync::Mutex;

use crate::api::{self, AppState};
use crate::config::Config;
use crate::models::notification::Notification;
use crate::notifications::store::JsonFileStore;
use crate::notifications::NotificationCenter;
use crate::payments::gateway::StripeGateway;

pub fn launch(conf: &Config) {
    // Print welcome message
    info!("Starting App in {}", conf.app.environment);

    let (tx, _rx) = broadcast::channel::<Notification>(32);

    // A missing key still lets the server come up; every provider call
    // will then fail with an auth error.
    let gateway = StripeGateway::new(
        conf.stripe.secret_key.clone().unwrap_or_default(),
        conf.stripe.api_url.clone(),
    );

    let store = JsonFileStore::new(conf.notifications.store_file.clone());
    let center = NotificationCenter::new(Box::new(store));

    let state = Arc::new(AppState {
        gateway: Arc::new(gateway),
        notifications: Mutex::new(center),
        tx,
        webhook_secret: conf.stripe.webhook_secret.clone(),
    });

    // Build a multi-threaded Tokio runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("glowlink-worker-thread")
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    runtime.block_on(async {
        api::serve(&conf.server, state).await;
    })
}
