// Interview Orchestrator: turn-based exchange with the remote interviewer.
// Every adopted question issues a TurnTicket; an answer must present the
// current ticket, which makes the first submission per turn win.

pub mod orchestrator;

pub use orchestrator::{current_ticket, turn_label, InterviewOrchestrator, InterviewStep};

use serde::{Deserialize, Serialize};

use crate::models::session::FlowId;

/// Rating recorded when the service omits one.
pub const DEFAULT_RATING: u32 = 7;
pub const MIN_RATING: u32 = 1;
pub const MAX_RATING: u32 = 10;

/// Asked when the service returns an empty or invalid next question.
pub const FALLBACK_QUESTION: &str = "Could you walk me through your professional background?";
pub const START_FAILURE_MESSAGE: &str = "Connection Error. Please check your AI keys.";
pub const ANSWER_FAILURE_MESSAGE: &str = "Connection lost. Please try again.";
pub const COMPLETION_MESSAGE: &str =
    "Excellent! You've completed the interview. Generating your final report now...";
pub const MISSING_FEEDBACK: &str = "No feedback provided.";

/// Identifies one interview turn within one flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnTicket {
    pub flow: FlowId,
    pub turn: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum InterviewState {
    AwaitingStart,
    AwaitingAnswer { ticket: TurnTicket },
    /// The answer for `ticket` is with the service; further answers for it are stale.
    TurnComplete { ticket: TurnTicket },
    InterviewDone,
}
