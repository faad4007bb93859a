use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use http::StatusCode;

use crate::api::{AppState, ErrorMessage};
use crate::common::sanitize::sanitize_input;
use crate::models::notification::{NewNotification, Notification, NotificationFeed};

pub async fn get_notifications(State(state): State<Arc<AppState>>) -> Json<NotificationFeed> {
    Json(state.notifications.lock().await.feed())
}

/// Text fields are stripped of markup before the entry is stored; the
/// created entry is echoed back with its assigned id.
pub async fn post_notification(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewNotification>,
) -> (StatusCode, Json<Notification>) {
    let new = NewNotification {
        title: sanitize_input(&new.title),
        message: sanitize_input(&new.message),
        ..new
    };

    let notification = state.notifications.lock().await.add(new);
    let _ = state.tx.send(notification.clone());

    (StatusCode::CREATED, Json(notification))
}

pub async fn put_notification_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorMessage>)> {
    if state.notifications.lock().await.mark_as_read(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, Json(ErrorMessage { error: "Notification not found".to_string() })))
    }
}

pub async fn put_all_notifications_read(State(state): State<Arc<AppState>>) -> StatusCode {
    state.notifications.lock().await.mark_all_as_read();
    StatusCode::NO_CONTENT
}

pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorMessage>)> {
    if state.notifications.lock().await.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, Json(ErrorMessage { error: "Notification not found".to_string() })))
    }
}

pub async fn delete_all_notifications(State(state): State<Arc<AppState>>) -> StatusCode {
    state.notifications.lock().await.clear_all();
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{state_with, MockGateway};
    use crate::models::notification::NotificationKind;

    fn new_notification(title: &str) -> NewNotification {
        NewNotification {
            title: title.to_string(),
            message: "You have a new booking request".to_string(),
            kind: NotificationKind::Info,
            action_url: Some("/bookings".to_string()),
        }
    }

    #[tokio::test]
    async fn feed_starts_empty() {
        let state = state_with(Arc::new(MockGateway::default()), None);

        let Json(feed) = get_notifications(State(state)).await;

        assert!(feed.notifications.is_empty());
        assert_eq!(feed.unread_count, 0);
    }

    #[tokio::test]
    async fn post_assigns_identity_and_broadcasts() {
        let state = state_with(Arc::new(MockGateway::default()), None);
        let mut rx = state.tx.subscribe();

        let (status, Json(created)) =
            post_notification(State(state.clone()), Json(new_notification("New Booking"))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(!created.id.is_empty());
        assert!(!created.read);
        assert_eq!(created.action_url.as_deref(), Some("/bookings"));

        assert_eq!(rx.try_recv().unwrap().id, created.id);

        let Json(feed) = get_notifications(State(state)).await;
        assert_eq!(feed.notifications.len(), 1);
        assert_eq!(feed.unread_count, 1);
    }

    #[tokio::test]
    async fn post_strips_markup_from_text_fields() {
        let state = state_with(Arc::new(MockGateway::default()), None);

        let (_, Json(created)) = post_notification(
            State(state),
            Json(NewNotification {
                title: "<script>alert(1)</script>Hello".to_string(),
                message: "<b>Bold</b> text".to_string(),
                kind: NotificationKind::Warning,
                action_url: None,
            }),
        )
        .await;

        assert_eq!(created.title, "Hello");
        assert_eq!(created.message, "Bold text");
    }

    #[tokio::test]
    async fn read_flow_drops_the_unread_count() {
        let state = state_with(Arc::new(MockGateway::default()), None);

        let (_, Json(created)) =
            post_notification(State(state.clone()), Json(new_notification("a"))).await;
        post_notification(State(state.clone()), Json(new_notification("b"))).await;

        let status = put_notification_read(State(state.clone()), Path(created.id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(feed) = get_notifications(State(state.clone())).await;
        assert_eq!(feed.unread_count, 1);

        assert_eq!(
            put_all_notifications_read(State(state.clone())).await,
            StatusCode::NO_CONTENT
        );
        let Json(feed) = get_notifications(State(state)).await;
        assert_eq!(feed.unread_count, 0);
    }

    #[tokio::test]
    async fn unknown_ids_are_a_404() {
        let state = state_with(Arc::new(MockGateway::default()), None);

        let (status, Json(body)) = put_notification_read(State(state.clone()), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Notification not found");

        let (status, _) = delete_notification(State(state), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_flows_remove_entries() {
        let state = state_with(Arc::new(MockGateway::default()), None);

        let (_, Json(created)) =
            post_notification(State(state.clone()), Json(new_notification("a"))).await;
        post_notification(State(state.clone()), Json(new_notification("b"))).await;

        delete_notification(State(state.clone()), Path(created.id))
            .await
            .unwrap();
        let Json(feed) = get_notifications(State(state.clone())).await;
        assert_eq!(feed.notifications.len(), 1);

        assert_eq!(
            delete_all_notifications(State(state.clone())).await,
            StatusCode::NO_CONTENT
        );
        let Json(feed) = get_notifications(State(state)).await;
        assert!(feed.notifications.is_empty());
    }
}
