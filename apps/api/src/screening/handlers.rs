use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::gateway::Gateway;
use crate::llm_client::ChatMessage;
use crate::models::candidate::CandidateRecord;
use crate::screening::conversation::ConversationHandler;
use crate::screening::fields::CandidateInfo;
use crate::screening::state::ConversationPhase;
use crate::state::{AppState, ScreeningSession};

#[derive(Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub greeting: String,
    pub phase: ConversationPhase,
    pub offline: bool,
}

#[derive(Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub phase: ConversationPhase,
    pub ended: bool,
    pub field_cursor: usize,
    pub candidate_info: CandidateInfo,
    pub tech_stack: Vec<String>,
    pub conversation_history: Vec<ChatMessage>,
    pub record_id: Option<String>,
}

#[derive(Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub reply: String,
    pub ended: bool,
    pub phase: ConversationPhase,
    pub record_id: Option<String>,
}

#[derive(Serialize)]
pub struct ResetResponse {
    pub greeting: String,
    pub phase: ConversationPhase,
}

#[derive(Serialize)]
pub struct ExportResponse {
    pub candidate_id: String,
    pub path: String,
}

async fn find_session(
    state: &AppState,
    id: Uuid,
) -> Result<Arc<Mutex<ScreeningSession>>, AppError> {
    state
        .session(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

fn snapshot_record(handler: &ConversationHandler) -> CandidateRecord {
    CandidateRecord::from_session(
        handler.candidate_info(),
        handler.conversation_history(),
        Local::now(),
    )
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AppError> {
    let gateway = Gateway::connect(state.backend.clone()).await;
    let mut handler = ConversationHandler::new(gateway);
    let greeting = handler.initial_greeting().await;

    let session_id = Uuid::new_v4();
    let response = CreateSessionResponse {
        session_id,
        greeting,
        phase: handler.phase(),
        offline: handler.is_offline(),
    };
    state
        .sessions
        .write()
        .await
        .insert(session_id, Arc::new(Mutex::new(ScreeningSession::new(handler))));

    info!(%session_id, offline = response.offline, "Screening session created");
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = find_session(&state, id).await?;
    let mut session = session.lock().await;
    session.touch();
    let handler = &session.handler;

    Ok(Json(SessionSnapshot {
        session_id: id,
        phase: handler.phase(),
        ended: handler.is_ended(),
        field_cursor: handler.field_cursor(),
        candidate_info: handler.candidate_info().clone(),
        tech_stack: handler.tech_stack().to_vec(),
        conversation_history: handler.conversation_history().to_vec(),
        record_id: session.record_id.clone(),
    }))
}

/// POST /api/v1/sessions/:id/messages
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let mut session = session.lock().await;
    session.touch();

    let reply = session.handler.process_message(&req.message).await;

    // Persist exactly once, on the first transition to ended
    if reply.ended && session.record_id.is_none() {
        let record = snapshot_record(&session.handler);
        match state.store.save(&record).await {
            Ok(saved) => {
                info!(session_id = %id, candidate_id = %saved.candidate_id, "Screening completed");
                session.record_id = Some(saved.candidate_id);
            }
            Err(e) => warn!(session_id = %id, "Failed to persist candidate record: {e}"),
        }
    }

    Ok(Json(MessageResponse {
        reply: reply.text,
        ended: reply.ended,
        phase: session.handler.phase(),
        record_id: session.record_id.clone(),
    }))
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResetResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let mut session = session.lock().await;
    session.touch();

    session.handler.reset();
    session.record_id = None;
    let greeting = session.handler.initial_greeting().await;

    info!(session_id = %id, "Screening session reset");
    Ok(Json(ResetResponse {
        greeting,
        phase: session.handler.phase(),
    }))
}

/// POST /api/v1/sessions/:id/export
pub async fn handle_export_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExportResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let mut session = session.lock().await;
    session.touch();

    if session.handler.candidate_info().is_empty() {
        return Err(AppError::Validation("No data to export yet".to_string()));
    }

    let saved = state.store.save(&snapshot_record(&session.handler)).await?;

    Ok(Json(ExportResponse {
        candidate_id: saved.candidate_id,
        path: saved.path.display().to_string(),
    }))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .sessions
        .write()
        .await
        .remove(&id)
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
    info!(session_id = %id, "Screening session deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::path::Path as FsPath;

    use axum::body::Body;
    use axum::http::Request;
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::routes::build_router;
    use crate::storage::JsonFileStore;

    fn app(data_dir: &FsPath) -> Router {
        let config = Config {
            anthropic_api_key: None,
            port: 0,
            rust_log: "info".to_string(),
            candidate_data_dir: data_dir.to_path_buf(),
            session_idle_timeout: std::time::Duration::from_secs(3600),
        };
        let store = Arc::new(JsonFileStore::new(data_dir));
        build_router(AppState::new(config, None, store))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn create(app: &Router) -> String {
        let (status, body) = send(app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    async fn message(app: &Router, id: &str, text: &str) -> Value {
        let (status, body) = send(
            app,
            "POST",
            &format!("/api/v1/sessions/{id}/messages"),
            Some(json!({ "message": text })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_create_session_returns_offline_greeting() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());

        let (status, body) = send(&app, "POST", "/api/v1/sessions", None).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["phase"], "info_gathering");
        assert_eq!(body["offline"], true);
        assert!(body["greeting"].as_str().unwrap().contains("TalentScout"));
    }

    #[tokio::test]
    async fn test_bye_persists_record() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());
        let id = create(&app).await;

        message(&app, &id, "Ada Lovelace").await;
        message(&app, &id, "ada@example.com").await;
        let body = message(&app, &id, "bye").await;

        assert_eq!(body["ended"], true);
        assert_eq!(body["phase"], "ended");
        let record_id = body["record_id"].as_str().unwrap();
        assert!(record_id.starts_with("candidate_"));

        let path = tmp.path().join(format!("{record_id}.json"));
        let saved: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(saved["candidate_info"]["full_name"], "Ada Lovelace");
        assert_eq!(saved["candidate_info"]["email"], "ada@example.com");
        assert!(saved["candidate_info"].get("phone").is_none());
        assert_eq!(
            saved["data_handling_notice"],
            "This data is collected for recruitment purposes only."
        );

        // Later messages neither re-persist nor lose the id
        let after = message(&app, &id, "hello?").await;
        assert_eq!(after["ended"], true);
        assert_eq!(after["record_id"], record_id);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_empty_message_is_not_an_http_error() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());
        let id = create(&app).await;

        let body = message(&app, &id, "   ").await;

        assert_eq!(body["ended"], false);
        assert_eq!(
            body["reply"],
            "I didn't quite catch that. Could you please try again?"
        );
    }

    #[tokio::test]
    async fn test_snapshot_reflects_progress() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());
        let id = create(&app).await;
        message(&app, &id, "Ada Lovelace").await;

        let (status, body) = send(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session_id"], id.as_str());
        assert_eq!(body["ended"], false);
        assert_eq!(body["field_cursor"], 2);
        assert_eq!(body["candidate_info"]["full_name"], "Ada Lovelace");
        assert_eq!(body["conversation_history"].as_array().unwrap().len(), 3);
        assert_eq!(body["record_id"], Value::Null);
    }

    #[tokio::test]
    async fn test_reset_starts_a_fresh_dialogue() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());
        let id = create(&app).await;
        message(&app, &id, "Ada Lovelace").await;

        let (status, body) = send(&app, "POST", &format!("/api/v1/sessions/{id}/reset"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "info_gathering");

        let (_, snapshot) = send(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(snapshot["candidate_info"], json!({}));
        assert_eq!(snapshot["conversation_history"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_export_writes_snapshot_mid_conversation() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());
        let id = create(&app).await;
        message(&app, &id, "Ada Lovelace").await;

        let (status, body) = send(&app, "POST", &format!("/api/v1/sessions/{id}/export"), None).await;

        assert_eq!(status, StatusCode::OK);
        let path = body["path"].as_str().unwrap();
        assert!(path.ends_with(&format!("{}.json", body["candidate_id"].as_str().unwrap())));
        assert!(std::path::Path::new(path).exists());
    }

    #[tokio::test]
    async fn test_export_without_data_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());
        let id = create(&app).await;

        let (status, body) = send(&app, "POST", &format!("/api/v1/sessions/{id}/export"), None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "No data to export yet");
        assert_eq!(std::fs::read_dir(tmp.path()).map(|d| d.count()).unwrap_or(0), 0);
    }

    #[tokio::test]
    async fn test_back_to_back_endings_each_persist() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());
        let first = create(&app).await;
        let second = create(&app).await;
        let third = create(&app).await;
        for id in [&first, &second, &third] {
            message(&app, id, "Ada Lovelace").await;
        }

        let (status, export) =
            send(&app, "POST", &format!("/api/v1/sessions/{third}/export"), None).await;
        assert_eq!(status, StatusCode::OK);
        let a = message(&app, &first, "bye").await;
        let b = message(&app, &second, "bye").await;
        let c = message(&app, &third, "bye").await;

        let mut ids: Vec<&str> = [&a, &b, &c]
            .into_iter()
            .map(|body| body["record_id"].as_str().unwrap())
            .collect();
        ids.push(export["candidate_id"].as_str().unwrap());
        for id in &ids {
            assert!(tmp.path().join(format!("{id}.json")).exists(), "missing {id}");
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 4);
    }

    #[tokio::test]
    async fn test_delete_then_unknown_session_is_404() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());
        let id = create(&app).await;

        let (status, _) = send(&app, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/messages"),
            Some(json!({ "message": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
