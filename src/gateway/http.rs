//! REST client for the CRM backend.
//!
//! Routes used:
//! - `GET  {base}/opportunities`
//! - `PUT  {base}/opportunities/{id}` with `{"pipelineStage": "..."}`
//! - `POST {base}/auth/refresh` (refresh token as bearer) on a 401
//!
//! The backend identifies opportunities by hyphenated UUID, so other ids are
//! refused before any request is built.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::StageGateway;
use crate::board::models::{Opportunity, PipelineStage, UpdateStageRequest};
use crate::errors::PersistenceError;
use crate::session::SessionStore;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    token: String,
    refresh_token: String,
}

/// True for a hyphenated UUID, the only id shape the backend accepts.
pub fn is_persistence_id(id: &str) -> bool {
    id.len() == 36 && uuid::Uuid::try_parse(id).is_ok()
}

pub struct HttpGateway {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl HttpGateway {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Arc<SessionStore>,
    ) -> Result<Self, PersistenceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pipeline/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request with the current bearer token. On a 401 the token pair
    /// is refreshed once and the request retried.
    async fn send<F>(&self, build: F) -> Result<Response, PersistenceError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let resp = with_bearer(build(&self.client), self.session.token())
            .send()
            .await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }
        if !self.refresh().await? {
            return Err(PersistenceError::Unauthorized(
                "session expired and could not be refreshed".to_string(),
            ));
        }
        let retry = with_bearer(build(&self.client), self.session.token())
            .send()
            .await?;
        Ok(retry)
    }

    /// Exchange the refresh token for a new pair. Returns `false` (and clears
    /// the session) when there is no refresh token or the backend refuses it.
    async fn refresh(&self) -> Result<bool, PersistenceError> {
        let Some(refresh_token) = self.session.refresh_token() else {
            self.clear_session();
            return Ok(false);
        };
        let resp = self
            .client
            .post(self.url("/auth/refresh"))
            .bearer_auth(refresh_token)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "token refresh refused");
            self.clear_session();
            return Ok(false);
        }
        let pair: RefreshResponse = resp.json().await?;
        if let Err(e) = self.session.update(pair.token, pair.refresh_token) {
            tracing::warn!(error = %e, "failed to store refreshed session");
        }
        tracing::debug!("session refreshed");
        Ok(true)
    }

    fn clear_session(&self) {
        if let Err(e) = self.session.clear() {
            tracing::warn!(error = %e, "failed to clear session");
        }
    }
}

fn with_bearer(builder: RequestBuilder, token: Option<String>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

/// Map a non-success response to a typed error.
async fn status_error(resp: Response, id: Option<&str>) -> PersistenceError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str().map(str::to_string))
        })
        .unwrap_or(body);
    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => PersistenceError::NotFound { id: id.to_string() },
        (StatusCode::UNAUTHORIZED, _) => PersistenceError::Unauthorized(message),
        (StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY, Some(_)) => {
            PersistenceError::InvalidStage(message)
        }
        _ => PersistenceError::Rejected {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl StageGateway for HttpGateway {
    async fn fetch_opportunities(&self) -> Result<Vec<Opportunity>, PersistenceError> {
        let url = self.url("/opportunities");
        let resp = self.send(|client| client.get(&url)).await?;
        if !resp.status().is_success() {
            return Err(status_error(resp, None).await);
        }
        let mut opportunities: Vec<Opportunity> = resp.json().await?;
        for opp in &mut opportunities {
            opp.persisted = is_persistence_id(&opp.id);
        }
        Ok(opportunities)
    }

    async fn update_stage(
        &self,
        id: &str,
        stage: PipelineStage,
    ) -> Result<Opportunity, PersistenceError> {
        if !is_persistence_id(id) {
            return Err(PersistenceError::InvalidId { id: id.to_string() });
        }
        let url = self.url(&format!("/opportunities/{}", id));
        let body = UpdateStageRequest {
            pipeline_stage: stage,
        };
        let resp = self.send(|client| client.put(&url).json(&body)).await?;
        if !resp.status().is_success() {
            return Err(status_error(resp, Some(id)).await);
        }
        let mut canonical: Opportunity = resp.json().await?;
        canonical.persisted = is_persistence_id(&canonical.id);
        Ok(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionTokens;

    #[test]
    fn test_is_persistence_id() {
        assert!(is_persistence_id("3f1c8f5e-1b2a-4c3d-9e8f-0a1b2c3d4e5f"));
        assert!(is_persistence_id("3F1C8F5E-1B2A-4C3D-9E8F-0A1B2C3D4E5F"));
        assert!(!is_persistence_id("1"));
        assert!(!is_persistence_id("3f1c8f5e1b2a4c3d9e8f0a1b2c3d4e5f"));
        assert!(!is_persistence_id("uuid-9"));
    }

    #[tokio::test]
    async fn test_non_uuid_id_never_reaches_the_network() {
        // Port 9 (discard) is never contacted: the id check fails first.
        let gw = HttpGateway::new(
            "http://127.0.0.1:9/api/v1/",
            Duration::from_millis(200),
            Arc::new(SessionStore::in_memory(SessionTokens::default())),
        )
        .unwrap();
        assert_eq!(gw.base_url(), "http://127.0.0.1:9/api/v1");
        let err = gw
            .update_stage("1", PipelineStage::ProspectQuote)
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidId { .. }));
    }

    #[tokio::test]
    async fn test_unrecognized_stage_maps_to_invalid_stage() {
        let state = crate::server::seeded_state(None);
        let id = state.store.snapshot()[0].id.clone();
        let listener = crate::server::bind(&crate::server::ServerConfig {
            port: 0,
            ..Default::default()
        })
        .await
        .unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(crate::server::serve_with_shutdown(
            listener,
            crate::server::build_router(state.clone(), false),
            async move {
                let _ = rx.await;
            },
        ));

        // The typed client cannot encode an unknown stage, so send the body by hand.
        let resp = Client::new()
            .put(format!("http://{}/api/v1/opportunities/{}", addr, id))
            .json(&serde_json::json!({ "pipelineStage": "NOPE" }))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_client_error());

        let err = status_error(resp, Some(&id)).await;
        assert!(
            matches!(err, PersistenceError::InvalidStage(_)),
            "Expected InvalidStage, got {:?}",
            err
        );
        assert_eq!(state.store.update_calls(), 0);
        let _ = tx.send(());
    }
}
