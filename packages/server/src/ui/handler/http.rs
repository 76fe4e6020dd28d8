//! HTTP API endpoint handlers.

use std::{fmt, sync::Arc};

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use hirewire_shared::event::NotificationEvent;

use crate::{
    domain::{AuthError, IdentityId, IdentityKind},
    infrastructure::dto::{
        handshake::extract_bearer_token,
        http::{ErrorDto, NotifyRequestDto, NotifyResponseDto, StatsDto},
    },
    ui::state::AppState,
};

fn error_response(status: StatusCode, error: impl fmt::Display) -> Response {
    (status, Json(ErrorDto::new(error))).into_response()
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Connection counts (debug)
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsDto> {
    Json(state.get_broker_stats_usecase.execute().into())
}

/// Ingress for a REST layer running in another process.
///
/// Only admins may push. The event is routed by its audience, so callers
/// cannot pick an arbitrary group.
pub async fn notify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(token) = extract_bearer_token(&headers) else {
        return error_response(StatusCode::UNAUTHORIZED, AuthError::MissingCredential);
    };
    let caller = match state.verifier.verify(token) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("Rejected notify request: {}", e);
            return error_response(StatusCode::UNAUTHORIZED, e);
        }
    };
    if caller.kind() != IdentityKind::Admin {
        tracing::warn!(caller = %caller.key(), "Non-admin caller on notify endpoint");
        return error_response(StatusCode::FORBIDDEN, "admin credential required");
    }

    let request = match serde_json::from_slice::<NotifyRequestDto>(&body) {
        Ok(request) => request,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };
    let event = match NotificationEvent::from_parts(request.event, request.data) {
        Ok(event) => event,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("invalid '{}' payload: {}", request.event, e),
            );
        }
    };
    let owner = match request.user_id.map(IdentityId::new).transpose() {
        Ok(owner) => owner,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    match state.emitter.dispatch(&event, owner.as_ref()) {
        Ok(delivered) => {
            tracing::info!(
                caller = %caller.key(),
                event = %event.name(),
                delivered,
                "Notification accepted"
            );
            (StatusCode::ACCEPTED, Json(NotifyResponseDto { delivered })).into_response()
        }
        Err(e) => error_response(StatusCode::BAD_REQUEST, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Connection, GroupBroker, Identity},
        infrastructure::{
            auth::{JwtTokenVerifier, TokenIssuer},
            broker::InMemoryGroupBroker,
        },
    };
    use axum::http::{HeaderValue, header::AUTHORIZATION};
    use hirewire_shared::{event::Envelope, time::FixedClock};
    use std::time::Duration;
    use tokio::sync::mpsc;

    const SECRET: &str = "http-handler-secret";

    fn create_test_state() -> (Arc<AppState>, Arc<InMemoryGroupBroker>) {
        let broker = Arc::new(InMemoryGroupBroker::new());
        let state = Arc::new(AppState::new(
            Arc::new(JwtTokenVerifier::new(SECRET)),
            broker.clone(),
            Arc::new(FixedClock::new(1000)),
            Duration::from_secs(25),
            Duration::from_secs(60),
        ));
        (state, broker)
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    fn admin_headers() -> HeaderMap {
        bearer(&TokenIssuer::new(SECRET, 60).issue_admin("a1", true).unwrap())
    }

    #[tokio::test]
    async fn test_notify_routes_status_update_to_owner() {
        // テスト項目: 管理者トークンでの通知は userId の専用グループにだけ届き 202 を返す
        // given (前提条件):
        let (state, broker) = create_test_state();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (other_tx, mut other_rx) = mpsc::unbounded_channel();
        broker
            .register(
                Connection::open(Identity::user(IdentityId::new("x").unwrap()), 0),
                tx,
            )
            .unwrap();
        broker
            .register(
                Connection::open(Identity::user(IdentityId::new("z").unwrap()), 0),
                other_tx,
            )
            .unwrap();
        let body = serde_json::json!({
            "event": "application-status-updated",
            "userId": "x",
            "data": {"jobId": "j1", "status": "Hired", "jobTitle": "T", "companyName": "C"}
        });

        // when (操作):
        let response = notify(
            State(state),
            admin_headers(),
            Bytes::from(body.to_string()),
        )
        .await;

        // then (期待する結果):
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let frame = Envelope::from_json(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(frame.data["status"], "Hired");
        assert!(other_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_notify_rejects_missing_or_user_token() {
        // テスト項目: トークン無しは 401、ユーザートークンは 403
        // given (前提条件):
        let (state, _broker) = create_test_state();
        let user_token = TokenIssuer::new(SECRET, 60).issue_user("u1").unwrap();
        let body = Bytes::from(r#"{"event":"job-deleted","data":{"jobId":"j1"}}"#);

        // when (操作):
        let missing = notify(State(state.clone()), HeaderMap::new(), body.clone()).await;
        let forbidden = notify(State(state), bearer(&user_token), body).await;

        // then (期待する結果):
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_notify_rejects_malformed_payloads() {
        // テスト項目: 壊れた JSON、形の合わないペイロード、userId 欠落は 400
        // given (前提条件):
        let (state, _broker) = create_test_state();
        let cases = [
            "not json",
            r#"{"event":"job-updated","data":{}}"#,
            r#"{"event":"new-application","data":{"jobId":"j1"}}"#,
            r#"{"event":"application-status-updated","data":{"jobId":"j1","status":"Hired","jobTitle":"T","companyName":"C"}}"#,
        ];

        for body in cases {
            // when (操作):
            let response = notify(State(state.clone()), admin_headers(), Bytes::from(body)).await;

            // then (期待する結果):
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        }
    }

    #[tokio::test]
    async fn test_notify_with_no_listeners_is_accepted() {
        // テスト項目: 受信者がいなくても 202 で delivered は 0
        // given (前提条件):
        let (state, _broker) = create_test_state();
        let body = Bytes::from(r#"{"event":"job-deleted","data":{"jobId":"j1"}}"#);

        // when (操作):
        let response = notify(State(state), admin_headers(), body).await;

        // then (期待する結果):
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_stats_counts_shared_groups() {
        // テスト項目: 統計は接続数と共有グループごとの人数を返す
        // given (前提条件):
        let (state, broker) = create_test_state();
        let (tx, _rx) = mpsc::unbounded_channel();
        broker
            .register(
                Connection::open(Identity::admin(IdentityId::new("a1").unwrap(), false), 0),
                tx,
            )
            .unwrap();

        // when (操作):
        let Json(dto) = stats(State(state)).await;

        // then (期待する結果):
        assert_eq!(
            dto,
            StatsDto {
                connections: 1,
                all_users: 0,
                admin_room: 1,
            }
        );
    }
}
