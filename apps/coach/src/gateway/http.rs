//! reqwest-backed `Gateway` speaking the backend's JSON API.
//!
//! Credentials ride on the session cookie set at login, so one `HttpGateway`
//! (one cookie jar) is shared for the whole user session. No call is retried:
//! recovery is always user-initiated.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    Credentials, ExportRequest, Gateway, GatewayError, HealthStatus, InterviewAnswerRequest,
    InterviewAnswerResponse, InterviewStartRequest, InterviewStartResponse, Registration,
    SaveResultsRequest,
};
use crate::models::user::{Profile, ResultRecord, ResumeAnalysis, User};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .cookie_store(true)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        debug!("POST {path}");
        let response = self.client.post(self.url(path)).json(body).send().await?;
        read_json(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        debug!("GET {path}");
        let response = self.client.get(self.url(path)).send().await?;
        read_json(response).await
    }
}

/// Decodes a JSON body, turning non-2xx statuses or an `error` field into `GatewayError::Api`.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        warn!("Backend returned {status}: {message}");
        return Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let value: Value = serde_json::from_str(&body)?;
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(GatewayError::Api {
            status: status.as_u16(),
            message: message.to_string(),
        });
    }
    Ok(serde_json::from_value(value)?)
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        self.get_json("/health").await
    }

    async fn register(&self, credentials: &Credentials) -> Result<Registration, GatewayError> {
        self.post_json("/register", credentials).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<User, GatewayError> {
        let mut user: User = self.post_json("/login", credentials).await?;
        if user.email.is_empty() {
            user.email = credentials.email.clone();
        }
        Ok(user)
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<User, GatewayError> {
        self.get_json(&format!("/profile/get/{user_id}")).await
    }

    async fn save_profile(&self, profile: &Profile) -> Result<(), GatewayError> {
        let _: Value = self.post_json("/profile/save", profile).await?;
        Ok(())
    }

    async fn upload_resume(
        &self,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<ResumeAnalysis, GatewayError> {
        debug!("POST /upload ({} bytes)", bytes.len());
        let part = multipart::Part::stream(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")?;
        let form = multipart::Form::new().part("resume", part);
        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await?;
        read_json(response).await
    }

    async fn interview_start(
        &self,
        request: &InterviewStartRequest,
    ) -> Result<InterviewStartResponse, GatewayError> {
        self.post_json("/interview/start", request).await
    }

    async fn interview_answer(
        &self,
        request: &InterviewAnswerRequest,
    ) -> Result<InterviewAnswerResponse, GatewayError> {
        self.post_json("/interview/answer", request).await
    }

    async fn export_report(&self, request: &ExportRequest) -> Result<Bytes, GatewayError> {
        debug!("POST /export/pdf");
        let response = self
            .client
            .post(self.url("/export/pdf"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.bytes().await?)
    }

    async fn save_results(&self, request: &SaveResultsRequest) -> Result<(), GatewayError> {
        let _: Value = self.post_json("/results/save", request).await?;
        Ok(())
    }

    async fn fetch_results(&self) -> Result<Vec<ResultRecord>, GatewayError> {
        self.get_json("/results/get").await
    }

    async fn logout(&self) -> Result<(), GatewayError> {
        let response = self.client.post(self.url("/logout")).send().await?;
        let _: Value = read_json(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        extract::{Multipart, Path},
        http::{header, HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;

    const SESSION_COOKIE: &str = "session=abc123";

    async fn login(Json(body): Json<Value>) -> impl IntoResponse {
        if body["password"] != "secret" {
            return (
                StatusCode::UNAUTHORIZED,
                [(header::CACHE_CONTROL, "no-store")],
                Json(json!({"error": "Invalid email or password"})),
            );
        }
        (
            StatusCode::OK,
            [(header::SET_COOKIE, "session=abc123; Path=/")],
            Json(json!({"user_id": "u-1", "name": "Ada", "onboarded": 1})),
        )
    }

    async fn profile(Path(user_id): Path<String>, headers: HeaderMap) -> impl IntoResponse {
        let authed = headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|c| c.contains(SESSION_COOKIE));
        if !authed {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"})));
        }
        (
            StatusCode::OK,
            Json(json!({"user_id": user_id, "email": "ada@example.com", "skills": "Rust, Go"})),
        )
    }

    async fn upload(mut multipart: Multipart) -> impl IntoResponse {
        while let Ok(Some(field)) = multipart.next_field().await {
            if field.name() == Some("resume") {
                let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
                return (
                    StatusCode::OK,
                    Json(json!({"session_id": "s-9", "score": len, "skills": ["Rust"]})),
                );
            }
        }
        (StatusCode::BAD_REQUEST, Json(json!({"error": "No file part"})))
    }

    async fn answer(Json(body): Json<Value>) -> Json<Value> {
        assert_eq!(body["context"], "Resume");
        Json(json!({"feedback": "Solid.", "next_question": "What is ownership?"}))
    }

    async fn export() -> impl IntoResponse {
        ([(header::CONTENT_TYPE, "application/pdf")], b"%PDF-1.4 fake".to_vec())
    }

    async fn spawn_backend() -> HttpGateway {
        let app = Router::new()
            .route("/api/health", get(|| async { Json(json!({"status": "healthy"})) }))
            .route("/api/login", post(login))
            .route("/api/profile/get/:user_id", get(profile))
            .route("/api/upload", post(upload))
            .route("/api/interview/answer", post(answer))
            .route("/api/export/pdf", post(export))
            .route(
                "/api/results/get",
                get(|| async { Json(json!([{"id": "r1", "feedback": ["Q: a | Feedback: b"]}])) }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        HttpGateway::new(format!("http://{addr}/api/"), Duration::from_secs(5))
    }

    fn creds(password: &str) -> Credentials {
        Credentials {
            email: "ada@example.com".into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_health() {
        let gw = spawn_backend().await;
        assert_eq!(gw.health().await.unwrap().status, "healthy");
    }

    #[tokio::test]
    async fn test_login_fills_email_and_keeps_cookie_for_profile() {
        let gw = spawn_backend().await;
        let user = gw.login(&creds("secret")).await.unwrap();
        assert_eq!(user.user_id, "u-1");
        assert_eq!(user.email, "ada@example.com");
        assert!(user.onboarded);

        let profile = gw.fetch_profile("u-1").await.unwrap();
        assert_eq!(profile.skills, vec!["Rust", "Go"]);
    }

    #[tokio::test]
    async fn test_login_error_field_becomes_api_error() {
        let gw = spawn_backend().await;
        match gw.login(&creds("wrong")).await {
            Err(GatewayError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid email or password");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_profile_without_cookie_is_unauthorized() {
        let gw = spawn_backend().await;
        assert!(matches!(
            gw.fetch_profile("u-1").await,
            Err(GatewayError::Api { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_upload_sends_resume_field() {
        let gw = spawn_backend().await;
        let analysis = gw
            .upload_resume("cv.pdf", Bytes::from_static(b"0123456789"))
            .await
            .unwrap();
        assert_eq!(analysis.session_id, "s-9");
        assert_eq!(analysis.score, 10);
    }

    #[tokio::test]
    async fn test_answer_without_rating() {
        let gw = spawn_backend().await;
        let response = gw
            .interview_answer(&InterviewAnswerRequest {
                session_id: Some("s-9".into()),
                question: "Tell me about yourself.".into(),
                answer: "I write Rust.".into(),
                context: "Resume".into(),
            })
            .await
            .unwrap();
        assert_eq!(response.rating, None);
        assert_eq!(response.next_question.as_deref(), Some("What is ownership?"));
    }

    #[tokio::test]
    async fn test_export_returns_bytes() {
        let gw = spawn_backend().await;
        let bytes = gw
            .export_report(&ExportRequest {
                user_id: "u-1".into(),
                domain: "Resume".into(),
                score_mcq: 4,
                score_interview: 8,
                feedback: vec![],
            })
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_fetch_results() {
        let gw = spawn_backend().await;
        let results = gw.fetch_results().await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn test_missing_route_is_api_error() {
        let gw = spawn_backend().await;
        assert!(matches!(
            gw.logout().await,
            Err(GatewayError::Api { status: 404, .. })
        ));
    }
}
