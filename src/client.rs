//! Typed client for the payment service. Covers the same surface the
//! browser clients call, so other backend components and integration
//! tests talk to the server through one place.

use http::StatusCode;
use log::error;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::models::notification::{NewNotification, Notification, NotificationFeed};
use crate::models::payment::{
    CheckoutRequest, CheckoutResponse, CreateIntentRequest, IntentResponse,
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request failed: {status} {body}")]
    Api { status: StatusCode, body: String },
}

pub struct PaymentsClient {
    http: reqwest::Client,
    base_url: String,
}

impl PaymentsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        PaymentsClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn create_booking_intent(
        &self,
        request: &CreateIntentRequest,
    ) -> Result<IntentResponse, ClientError> {
        self.post_json("/payment/booking-intent", request).await
    }

    pub async fn create_completion_intent(
        &self,
        request: &CreateIntentRequest,
    ) -> Result<IntentResponse, ClientError> {
        self.post_json("/payment/completion-intent", request).await
    }

    pub async fn create_cancellation_intent(
        &self,
        request: &CreateIntentRequest,
    ) -> Result<IntentResponse, ClientError> {
        self.post_json("/payment/cancellation-intent", request).await
    }

    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutResponse, ClientError> {
        self.post_json("/create-checkout-session", request).await
    }

    pub async fn fetch_notifications(&self) -> Result<NotificationFeed, ClientError> {
        self.get_json("/notifications").await
    }

    pub async fn add_notification(
        &self,
        new: &NewNotification,
    ) -> Result<Notification, ClientError> {
        self.post_json("/notifications", new).await
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .put(format!("{}/notifications/{}/read", self.base_url, id))
            .send()
            .await?;
        Self::check(response).await.map(|_| ())
    }

    pub async fn mark_all_notifications_read(&self) -> Result<(), ClientError> {
        let response = self
            .http
            .put(format!("{}/notifications/read-all", self.base_url))
            .send()
            .await?;
        Self::check(response).await.map(|_| ())
    }

    pub async fn remove_notification(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(format!("{}/notifications/{}", self.base_url, id))
            .send()
            .await?;
        Self::check(response).await.map(|_| ())
    }

    pub async fn clear_notifications(&self) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(format!("{}/notifications", self.base_url))
            .send()
            .await?;
        Self::check(response).await.map(|_| ())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        Ok(Self::check(response).await?.json::<T>().await?)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        Ok(Self::check(response).await?.json::<T>().await?)
    }

    /// Error responses are logged here and handed back to the caller.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ClientError::Api { status, body };
        error!("API request failed: {}", err);
        Err(err)
    }
}
