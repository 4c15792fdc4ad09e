//! Scripted in-memory gateway for tests. Responses are queued per endpoint;
//! every request is recorded for later assertions.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::*;

/// A queued outcome. `GatewayError` is not `Clone`, so failures are described
/// here and materialised when popped.
#[derive(Debug, Clone)]
pub enum Scripted<T> {
    Ok(T),
    ServiceError(String),
    TransportError,
}

impl<T> Scripted<T> {
    fn resolve(self) -> Result<T, GatewayError> {
        match self {
            Scripted::Ok(value) => Ok(value),
            Scripted::ServiceError(message) => Err(GatewayError::Api {
                status: 500,
                message,
            }),
            Scripted::TransportError => Err(transport_error()),
        }
    }
}

/// What a backend returning an HTML error page looks like to the client.
pub fn transport_error() -> GatewayError {
    GatewayError::Parse(
        serde_json::from_str::<serde_json::Value>("<html>502</html>").unwrap_err(),
    )
}

#[derive(Default)]
pub struct ScriptedGateway {
    pub starts: Mutex<VecDeque<Scripted<InterviewStartResponse>>>,
    pub answers: Mutex<VecDeque<Scripted<InterviewAnswerResponse>>>,
    pub logins: Mutex<VecDeque<Scripted<User>>>,
    pub uploads: Mutex<VecDeque<Scripted<ResumeAnalysis>>>,
    pub exports: Mutex<VecDeque<Scripted<Bytes>>>,
    pub logout_fails: Mutex<bool>,

    pub start_requests: Mutex<Vec<InterviewStartRequest>>,
    pub answer_requests: Mutex<Vec<InterviewAnswerRequest>>,
    pub export_requests: Mutex<Vec<ExportRequest>>,
    pub saved_profiles: Mutex<Vec<Profile>>,
    pub saved_results: Mutex<Vec<SaveResultsRequest>>,
    pub logouts: Mutex<usize>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_start(&self, outcome: Scripted<InterviewStartResponse>) {
        self.starts.lock().unwrap().push_back(outcome);
    }

    pub fn push_answer(&self, outcome: Scripted<InterviewAnswerResponse>) {
        self.answers.lock().unwrap().push_back(outcome);
    }

    pub fn push_login(&self, outcome: Scripted<User>) {
        self.logins.lock().unwrap().push_back(outcome);
    }

    pub fn push_upload(&self, outcome: Scripted<ResumeAnalysis>) {
        self.uploads.lock().unwrap().push_back(outcome);
    }

    pub fn push_export(&self, outcome: Scripted<Bytes>) {
        self.exports.lock().unwrap().push_back(outcome);
    }

    pub fn answer_count(&self) -> usize {
        self.answer_requests.lock().unwrap().len()
    }
}

pub fn answer(rating: Option<i64>, feedback: &str, next: &str) -> InterviewAnswerResponse {
    InterviewAnswerResponse {
        rating,
        feedback: Some(feedback.to_string()),
        next_question: Some(next.to_string()),
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        Ok(HealthStatus {
            status: "healthy".into(),
        })
    }

    async fn register(&self, _credentials: &Credentials) -> Result<Registration, GatewayError> {
        Ok(Registration {
            message: "User registered successfully".into(),
            user_id: "u-new".into(),
        })
    }

    async fn login(&self, credentials: &Credentials) -> Result<User, GatewayError> {
        self.logins
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Scripted::Ok(User {
                    user_id: "u-1".into(),
                    email: credentials.email.clone(),
                    name: "User".into(),
                    ..Default::default()
                })
            })
            .resolve()
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<User, GatewayError> {
        Ok(User {
            user_id: user_id.to_string(),
            name: "Profiled".into(),
            onboarded: true,
            ..Default::default()
        })
    }

    async fn save_profile(&self, profile: &Profile) -> Result<(), GatewayError> {
        self.saved_profiles.lock().unwrap().push(profile.clone());
        Ok(())
    }

    async fn upload_resume(
        &self,
        _file_name: &str,
        _bytes: Bytes,
    ) -> Result<ResumeAnalysis, GatewayError> {
        self.uploads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Scripted::Ok(ResumeAnalysis {
                    session_id: "s-uploaded".into(),
                    score: 75,
                    skills: vec!["Python".into()],
                })
            })
            .resolve()
    }

    async fn interview_start(
        &self,
        request: &InterviewStartRequest,
    ) -> Result<InterviewStartResponse, GatewayError> {
        self.start_requests.lock().unwrap().push(request.clone());
        self.starts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Scripted::Ok(InterviewStartResponse {
                    question: "Tell me about yourself.".into(),
                    session_id: request.session_id.clone(),
                })
            })
            .resolve()
    }

    async fn interview_answer(
        &self,
        request: &InterviewAnswerRequest,
    ) -> Result<InterviewAnswerResponse, GatewayError> {
        let turn = {
            let mut requests = self.answer_requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Scripted::Ok(answer(Some(7), "Good response.", &format!("Question {}", turn + 1)))
            })
            .resolve()
    }

    async fn export_report(&self, request: &ExportRequest) -> Result<Bytes, GatewayError> {
        self.export_requests.lock().unwrap().push(request.clone());
        self.exports
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Scripted::Ok(Bytes::from_static(b"%PDF-1.4")))
            .resolve()
    }

    async fn save_results(&self, request: &SaveResultsRequest) -> Result<(), GatewayError> {
        self.saved_results.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn fetch_results(&self) -> Result<Vec<ResultRecord>, GatewayError> {
        Ok(Vec::new())
    }

    async fn logout(&self) -> Result<(), GatewayError> {
        *self.logouts.lock().unwrap() += 1;
        if *self.logout_fails.lock().unwrap() {
            return Err(transport_error());
        }
        Ok(())
    }
}
