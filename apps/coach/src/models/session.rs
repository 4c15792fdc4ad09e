//! Session model: the single mutable record of one user's progress through the flow.
//!
//! Owned by the `Controller`; mutated only through the assessment engine and
//! the interview orchestrator. `reset` returns it to `Idle` under a fresh `FlowId`
//! so that results of abandoned in-flight requests can be recognised and dropped.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::McqState;
use crate::interview::InterviewState;
use crate::models::question::Question;
use crate::models::user::ResumeAnalysis;

// ────────────────────────────────────────────────────────────────────────────
// Phase / category / context
// ────────────────────────────────────────────────────────────────────────────

/// Top-level position in the user flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    ResumeUpload,
    AssessmentMcq,
    Interview,
    Report,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Idle => "Dashboard",
            Phase::ResumeUpload => "Resume Upload",
            Phase::AssessmentMcq => "Assessment Module",
            Phase::Interview => "AI Interview",
            Phase::Report => "Performance Report",
        };
        f.write_str(label)
    }
}

/// A quiz category: the two fixed stages or a domain specialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Tech,
    Aptitude,
    Domain(String),
}

/// Questions drawn for the fixed tech/aptitude stages.
pub const FIXED_CATEGORY_SAMPLE: usize = 3;
/// Questions drawn for a domain category.
pub const DOMAIN_CATEGORY_SAMPLE: usize = 5;

impl Category {
    /// Key into the question pool.
    pub fn pool_key(&self) -> &str {
        match self {
            Category::Tech => "tech",
            Category::Aptitude => "apt",
            Category::Domain(name) => name,
        }
    }

    pub fn sample_size(&self) -> usize {
        match self {
            Category::Tech | Category::Aptitude => FIXED_CATEGORY_SAMPLE,
            Category::Domain(_) => DOMAIN_CATEGORY_SAMPLE,
        }
    }

    pub fn slot(&self) -> ScoreSlot {
        match self {
            Category::Tech => ScoreSlot::Tech,
            Category::Aptitude => ScoreSlot::Aptitude,
            Category::Domain(_) => ScoreSlot::Domain,
        }
    }
}

/// What the remote interviewer is asked to focus on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterviewContext {
    Resume,
    Common,
    Domain(String),
}

/// Turn cap for domain and behavioral interviews.
pub const SHORT_INTERVIEW_LIMIT: usize = 2;
/// Turn cap for resume-based interviews.
pub const LONG_INTERVIEW_LIMIT: usize = 5;

impl InterviewContext {
    /// Wire value sent as `context` to the interview service.
    pub fn as_str(&self) -> &str {
        match self {
            InterviewContext::Resume => "Resume",
            InterviewContext::Common => "Common",
            InterviewContext::Domain(name) => name,
        }
    }

    pub fn turn_limit(&self) -> usize {
        match self {
            InterviewContext::Resume => LONG_INTERVIEW_LIMIT,
            InterviewContext::Common | InterviewContext::Domain(_) => SHORT_INTERVIEW_LIMIT,
        }
    }

    /// Label used in the interview title.
    pub fn label(&self) -> &str {
        match self {
            InterviewContext::Common => "HR",
            other => other.as_str(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scores
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSlot {
    Tech,
    Aptitude,
    Domain,
}

/// Correct-answer counts per quiz category. Every slot starts at 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub tech: u32,
    #[serde(rename = "apt")]
    pub aptitude: u32,
    pub domain: u32,
}

impl Scores {
    pub fn increment(&mut self, slot: ScoreSlot) {
        match slot {
            ScoreSlot::Tech => self.tech += 1,
            ScoreSlot::Aptitude => self.aptitude += 1,
            ScoreSlot::Domain => self.domain += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.tech + self.aptitude + self.domain
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Logs
// ────────────────────────────────────────────────────────────────────────────

/// One recorded interview turn, kept for the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub question: String,
    pub feedback: String,
}

impl fmt::Display for FeedbackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q: {} | Feedback: {}", self.question, self.feedback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Bot,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Session state
// ────────────────────────────────────────────────────────────────────────────

/// Identifies one run of the flow. Regenerated on every reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowId(Uuid);

impl FlowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FlowId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub flow_id: FlowId,
    pub phase: Phase,

    pub mcq: McqState,
    pub mcq_category: Option<Category>,
    pub mcq_index: usize,
    pub scores: Scores,
    pub active_questions: Vec<Question>,

    pub interview: InterviewState,
    pub interview_context: InterviewContext,
    pub interview_turn_index: usize,
    pub interview_limit: usize,
    pub interview_ratings: Vec<u32>,
    pub feedback_log: Vec<FeedbackEntry>,
    pub current_question: Option<String>,
    pub conversation: Vec<ConversationEntry>,

    /// Backend correlation id; survives `reset` since the backend still holds the analysis.
    pub session_id: Option<String>,
    pub analysis: Option<ResumeAnalysis>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            flow_id: FlowId::new(),
            phase: Phase::Idle,
            mcq: McqState::CategoryStart,
            mcq_category: None,
            mcq_index: 0,
            scores: Scores::default(),
            active_questions: Vec::new(),
            interview: InterviewState::AwaitingStart,
            interview_context: InterviewContext::Resume,
            interview_turn_index: 0,
            interview_limit: LONG_INTERVIEW_LIMIT,
            interview_ratings: Vec::new(),
            feedback_log: Vec::new(),
            current_question: None,
            conversation: Vec::new(),
            session_id: None,
            analysis: None,
        }
    }

    /// Selected specialization, if this is a domain flow.
    pub fn domain(&self) -> Option<&str> {
        match &self.interview_context {
            InterviewContext::Domain(name) => Some(name),
            _ => None,
        }
    }

    /// The question currently shown in the MCQ phase.
    pub fn current_mcq(&self) -> Option<&Question> {
        match self.mcq {
            McqState::QuestionShown => self.active_questions.get(self.mcq_index),
            _ => None,
        }
    }

    pub fn push_message(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.conversation.push(ConversationEntry {
            speaker,
            text: text.into(),
            at: Utc::now(),
        });
    }

    /// Clears progress and returns to `Idle` under a new flow id.
    pub fn reset(&mut self) {
        let session_id = self.session_id.take();
        let analysis = self.analysis.take();
        *self = Self {
            session_id,
            analysis,
            ..Self::new()
        };
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
