//! Controller: owns the user and the single `SessionState`, and sequences
//! the top-level phases: dashboard → (upload) → assessment → interview → report.
//!
//! All mutation of the session goes through here; the assessment engine and
//! the interview orchestrator receive it by `&mut` for the duration of a call.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};

use crate::assessment::{AssessmentEngine, McqStep};
use crate::bank::QuestionBank;
use crate::errors::AppError;
use crate::gateway::{Credentials, Gateway};
use crate::interview::{
    current_ticket, InterviewOrchestrator, InterviewState, InterviewStep, TurnTicket,
};
use crate::models::question::BehavioralPrompt;
use crate::models::session::{Category, InterviewContext, Phase, SessionState};
use crate::models::user::{Profile, ResultRecord, ResumeAnalysis, User};
use crate::report::{finalize, ReportBuilder, ReportSummary};
use crate::voice::Voice;

/// Entry points offered on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Module {
    Resume,
    Domain(String),
    Common,
}

/// What the UI should present next.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowStep {
    AwaitingUpload,
    /// An MCQ question is showing (`session().current_mcq()`).
    Question,
    /// A new quiz category began after the previous one finished.
    CategoryChanged(Category),
    /// An interview question is waiting for an answer.
    InterviewQuestion,
    Report(ReportSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    NeedsOnboarding,
    Ready,
}

/// Raw onboarding / profile-edit form input.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub name: String,
    pub phone: String,
    pub college: String,
    pub year: String,
    pub skills: String,
    pub photo: Option<String>,
}

pub struct Controller {
    gateway: Arc<dyn Gateway>,
    assessment: AssessmentEngine,
    interview: InterviewOrchestrator,
    reports: ReportBuilder,
    user: Option<User>,
    session: SessionState,
}

impl Controller {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        voice: Arc<dyn Voice>,
        bank: Arc<QuestionBank>,
        report_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            assessment: AssessmentEngine::new(bank),
            interview: InterviewOrchestrator::new(gateway.clone(), voice),
            reports: ReportBuilder::new(gateway.clone(), report_dir),
            gateway,
            user: None,
            session: SessionState::new(),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn domains(&self) -> Vec<&str> {
        self.assessment.bank().domains()
    }

    pub fn behavioral_prompts(&self) -> &[BehavioralPrompt] {
        self.assessment.bank().behavioral()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Authentication & profile
    // ────────────────────────────────────────────────────────────────────────

    /// Creates an account. The user still has to log in afterwards.
    pub async fn register(&self, email: &str, password: &str) -> Result<String, AppError> {
        let credentials = credentials(email, password)?;
        let registration = self.gateway.register(&credentials).await?;
        info!("Registered user {}", registration.user_id);
        Ok(registration.message)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let credentials = credentials(email, password)?;
        let mut user = self.gateway.login(&credentials).await?;
        user.email = credentials.email.clone();

        if user.onboarded {
            let mut profile = self.gateway.fetch_profile(&user.user_id).await?;
            if profile.email.is_empty() {
                profile.email = user.email.clone();
            }
            user = profile;
        }

        info!("Signed in as {}", user.user_id);
        let outcome = if user.onboarded {
            LoginOutcome::Ready
        } else {
            LoginOutcome::NeedsOnboarding
        };
        self.user = Some(user);
        self.session = SessionState::new();
        Ok(outcome)
    }

    /// Saves onboarding or edited profile details.
    pub async fn save_profile(&mut self, form: ProfileForm) -> Result<(), AppError> {
        let user = self.user.as_ref().ok_or(AppError::SessionRequired)?;
        let name = form.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Please enter your name.".to_string()));
        }

        let profile = Profile {
            user_id: user.user_id.clone(),
            name: name.to_string(),
            phone: form.phone.trim().to_string(),
            college: form.college.trim().to_string(),
            year: Profile::parse_year(&form.year),
            skills: form.skills.trim().to_string(),
            photo: form.photo,
        };
        self.gateway.save_profile(&profile).await?;

        if let Some(user) = self.user.as_mut() {
            user.apply_profile(&profile);
        }
        Ok(())
    }

    /// Best-effort remote logout; local state is cleared whatever happens.
    pub async fn logout(&mut self) {
        if let Err(e) = self.gateway.logout().await {
            warn!("Logout request failed: {e}");
        }
        self.user = None;
        self.session = SessionState::new();
    }

    // ────────────────────────────────────────────────────────────────────────
    // Resume upload
    // ────────────────────────────────────────────────────────────────────────

    /// Uploads a resume for analysis; the returned session id correlates later
    /// interview calls. Allowed during onboarding and in the upload phase.
    pub async fn upload_resume(
        &mut self,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<ResumeAnalysis, AppError> {
        if !matches!(self.session.phase, Phase::Idle | Phase::ResumeUpload) {
            return Err(AppError::invalid_state("upload a resume", self.session.phase));
        }
        if bytes.is_empty() {
            return Err(AppError::Validation("Please choose a resume file.".to_string()));
        }

        let flow = self.session.flow_id;
        let analysis = self.gateway.upload_resume(file_name, bytes).await?;
        if self.session.flow_id != flow {
            return Err(AppError::Stale("resume upload".to_string()));
        }

        info!(
            "Resume analyzed: score {}, {} skills",
            analysis.score,
            analysis.skills.len()
        );
        self.session.session_id = Some(analysis.session_id.clone());
        self.session.analysis = Some(analysis.clone());
        Ok(analysis)
    }

    /// Moves from the analysis result into the two-stage quiz.
    pub async fn continue_after_upload(&mut self) -> Result<FlowStep, AppError> {
        if self.session.phase != Phase::ResumeUpload {
            return Err(AppError::invalid_state("continue", self.session.phase));
        }
        if self.session.session_id.is_none() {
            return Err(AppError::Validation(
                "Upload your resume before continuing.".to_string(),
            ));
        }
        self.begin_category(Category::Tech).await
    }

    // ────────────────────────────────────────────────────────────────────────
    // Modules
    // ────────────────────────────────────────────────────────────────────────

    pub async fn start_module(&mut self, module: Module) -> Result<FlowStep, AppError> {
        if self.user.is_none() {
            return Err(AppError::SessionRequired);
        }
        if self.session.phase != Phase::Idle {
            return Err(AppError::invalid_state("start a module", self.session.phase));
        }
        let module = match module {
            Module::Domain(name) => Module::Domain(self.known_domain(&name)?),
            other => other,
        };

        let context = match &module {
            Module::Resume => InterviewContext::Resume,
            Module::Domain(name) => InterviewContext::Domain(name.clone()),
            Module::Common => InterviewContext::Common,
        };
        info!("Starting module {:?}", module);
        self.session.interview_limit = context.turn_limit();
        self.session.interview_context = context;

        match module {
            Module::Resume if self.session.session_id.is_some() => {
                self.begin_category(Category::Tech).await
            }
            Module::Resume => {
                self.session.phase = Phase::ResumeUpload;
                Ok(FlowStep::AwaitingUpload)
            }
            Module::Domain(name) => self.begin_category(Category::Domain(name)).await,
            Module::Common => {
                self.session.phase = Phase::Interview;
                self.start_interview().await
            }
        }
    }

    /// Canonical bank name for `name`, matched case-insensitively.
    fn known_domain(&self, name: &str) -> Result<String, AppError> {
        let domains = self.domains();
        domains
            .iter()
            .find(|d| d.eq_ignore_ascii_case(name.trim()))
            .map(|d| d.to_string())
            .ok_or_else(|| {
                AppError::Validation(format!("Please choose one of: {}.", domains.join(", ")))
            })
    }

    async fn begin_category(&mut self, category: Category) -> Result<FlowStep, AppError> {
        let step = self.assessment.begin_category(&mut self.session, category)?;
        self.after_mcq(step).await
    }

    pub async fn answer_mcq(&mut self, selected: usize) -> Result<FlowStep, AppError> {
        let step = self.assessment.submit_answer(&mut self.session, selected)?;
        self.after_mcq(step).await
    }

    async fn after_mcq(&mut self, step: McqStep) -> Result<FlowStep, AppError> {
        match step {
            McqStep::Question => Ok(FlowStep::Question),
            McqStep::Chained(category) => Ok(FlowStep::CategoryChanged(category)),
            McqStep::Finished => self.start_interview().await,
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Interview
    // ────────────────────────────────────────────────────────────────────────

    /// Requests the opening question; also the manual retry after a failed start.
    pub async fn start_interview(&mut self) -> Result<FlowStep, AppError> {
        let step = self.interview.start(&mut self.session).await?;
        Ok(self.after_interview(step))
    }

    pub async fn answer_interview(&mut self, text: &str) -> Result<FlowStep, AppError> {
        let ticket = self.pending_ticket()?;
        let step = self
            .interview
            .submit_answer(&mut self.session, ticket, text)
            .await?;
        Ok(self.after_interview(step))
    }

    pub async fn answer_by_voice(&mut self) -> Result<FlowStep, AppError> {
        let ticket = self.pending_ticket()?;
        let step = self
            .interview
            .submit_voice_answer(&mut self.session, ticket)
            .await?;
        Ok(self.after_interview(step))
    }

    fn pending_ticket(&self) -> Result<TurnTicket, AppError> {
        current_ticket(&self.session)
            .ok_or_else(|| AppError::invalid_state("answer", self.session.interview))
    }

    fn after_interview(&self, step: InterviewStep) -> FlowStep {
        match step {
            InterviewStep::Question(_) => FlowStep::InterviewQuestion,
            InterviewStep::Done => FlowStep::Report(finalize(&self.session)),
        }
    }

    pub fn interview_needs_start(&self) -> bool {
        self.session.phase == Phase::Interview
            && self.session.interview == InterviewState::AwaitingStart
    }

    // ────────────────────────────────────────────────────────────────────────
    // Report
    // ────────────────────────────────────────────────────────────────────────

    pub fn report(&self) -> Result<ReportSummary, AppError> {
        if self.session.phase != Phase::Report {
            return Err(AppError::invalid_state("show the report", self.session.phase));
        }
        Ok(finalize(&self.session))
    }

    pub async fn export_report(&self) -> Result<PathBuf, AppError> {
        if self.session.phase != Phase::Report {
            return Err(AppError::invalid_state("export", self.session.phase));
        }
        self.reports.export(&self.session, self.user.as_ref()).await
    }

    pub async fn save_results(&self) -> Result<(), AppError> {
        if self.session.phase != Phase::Report {
            return Err(AppError::invalid_state("save results", self.session.phase));
        }
        self.reports.save_results(&self.session, self.user.as_ref()).await
    }

    pub async fn history(&self) -> Result<Vec<ResultRecord>, AppError> {
        if self.user.is_none() {
            return Err(AppError::SessionRequired);
        }
        self.reports.history().await
    }

    /// Abandons the current flow unconditionally.
    pub fn return_to_dashboard(&mut self) {
        info!("Returning to dashboard from {}", self.session.phase);
        self.session.reset();
    }
}

fn credentials(email: &str, password: &str) -> Result<Credentials, AppError> {
    let email = email.trim();
    let password = password.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation("Please fill all fields.".to_string()));
    }
    Ok(Credentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}
