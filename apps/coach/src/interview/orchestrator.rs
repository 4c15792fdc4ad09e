//! Interview Orchestrator: drives the question/answer exchange.
//!
//! Flow: start → (answer → rating + feedback + next question)* → done.
//!
//! Each remote call is split into a `prepare`/`begin` half that validates and
//! claims the state, and an `apply`/`complete` half that applies the response.
//! The halves carry the `FlowId`/`TurnTicket` they were issued under, so a
//! response that lands after a reset or for an already-answered turn is dropped.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::gateway::{
    Gateway, GatewayError, InterviewAnswerRequest, InterviewAnswerResponse,
    InterviewStartRequest, InterviewStartResponse,
};
use crate::interview::{
    InterviewState, TurnTicket, ANSWER_FAILURE_MESSAGE, COMPLETION_MESSAGE, DEFAULT_RATING,
    FALLBACK_QUESTION, MAX_RATING, MIN_RATING, MISSING_FEEDBACK, START_FAILURE_MESSAGE,
};
use crate::models::session::{FeedbackEntry, FlowId, Phase, SessionState, Speaker};
use crate::voice::Voice;

/// Where the interview stands after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewStep {
    /// A question is waiting; answer it with this ticket.
    Question(TurnTicket),
    /// The turn limit was reached; the session is in `Phase::Report`.
    Done,
}

#[derive(Debug, Clone)]
pub struct PendingStart {
    pub flow: FlowId,
    pub request: InterviewStartRequest,
}

#[derive(Debug, Clone)]
pub struct PendingAnswer {
    pub ticket: TurnTicket,
    pub request: InterviewAnswerRequest,
}

#[derive(Clone)]
pub struct InterviewOrchestrator {
    gateway: Arc<dyn Gateway>,
    voice: Arc<dyn Voice>,
}

impl InterviewOrchestrator {
    pub fn new(gateway: Arc<dyn Gateway>, voice: Arc<dyn Voice>) -> Self {
        Self { gateway, voice }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Start
    // ────────────────────────────────────────────────────────────────────────

    /// Requests the opening question.
    pub async fn start(&self, session: &mut SessionState) -> Result<InterviewStep, AppError> {
        let pending = self.prepare_start(session)?;
        let result = self.gateway.interview_start(&pending.request).await;
        self.apply_start(session, pending.flow, result)
    }

    pub fn prepare_start(&self, session: &SessionState) -> Result<PendingStart, AppError> {
        if session.phase != Phase::Interview || session.interview != InterviewState::AwaitingStart
        {
            return Err(AppError::invalid_state(
                "start the interview",
                (session.phase, session.interview),
            ));
        }
        Ok(PendingStart {
            flow: session.flow_id,
            request: InterviewStartRequest {
                session_id: session.session_id.clone(),
                context: session.interview_context.as_str().to_string(),
            },
        })
    }

    /// Applies the start response. On failure a placeholder message takes the
    /// question's place and the interview stays startable.
    pub fn apply_start(
        &self,
        session: &mut SessionState,
        flow: FlowId,
        result: Result<InterviewStartResponse, GatewayError>,
    ) -> Result<InterviewStep, AppError> {
        if session.flow_id != flow
            || session.phase != Phase::Interview
            || session.interview != InterviewState::AwaitingStart
        {
            warn!("Discarding interview start result for an abandoned flow");
            return Err(AppError::Stale("interview start".to_string()));
        }

        match result {
            Ok(response) => {
                if session.session_id.is_none() {
                    if let Some(id) = response.session_id {
                        debug!("Adopting backend-issued session id");
                        session.session_id = Some(id);
                    }
                }
                info!(
                    "Interview started (context: {}, limit: {})",
                    session.interview_context.as_str(),
                    session.interview_limit
                );
                let question = usable_question(Some(response.question));
                Ok(InterviewStep::Question(self.adopt_question(session, question)))
            }
            Err(e) => {
                warn!("Interview start failed: {e}");
                session.push_message(Speaker::Bot, START_FAILURE_MESSAGE);
                Err(e.into())
            }
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Answers
    // ────────────────────────────────────────────────────────────────────────

    /// Sends an answer for `ticket`'s turn and applies the reply.
    pub async fn submit_answer(
        &self,
        session: &mut SessionState,
        ticket: TurnTicket,
        text: &str,
    ) -> Result<InterviewStep, AppError> {
        let pending = self.begin_answer(session, ticket, text)?;
        let result = self.gateway.interview_answer(&pending.request).await;
        self.complete_answer(session, pending.ticket, result)
    }

    /// Captures a spoken answer and submits it through the same path as typed input.
    pub async fn submit_voice_answer(
        &self,
        session: &mut SessionState,
        ticket: TurnTicket,
    ) -> Result<InterviewStep, AppError> {
        let transcript = self.voice.capture_speech().await?;
        self.submit_answer(session, ticket, &transcript).await
    }

    /// Validates the answer and claims the turn. Nothing is sent for empty input.
    pub fn begin_answer(
        &self,
        session: &mut SessionState,
        ticket: TurnTicket,
        text: &str,
    ) -> Result<PendingAnswer, AppError> {
        match session.interview {
            InterviewState::AwaitingAnswer { ticket: current } if current == ticket => {}
            InterviewState::AwaitingAnswer { .. } | InterviewState::TurnComplete { .. } => {
                return Err(AppError::Stale(format!(
                    "answer for turn {} of flow {:?}",
                    ticket.turn, ticket.flow
                )));
            }
            state => {
                return Err(AppError::invalid_state("answer", state));
            }
        }

        let answer = text.trim();
        if answer.is_empty() {
            return Err(AppError::Validation(
                "Please type or speak an answer first.".to_string(),
            ));
        }

        let question = session.current_question.clone().unwrap_or_default();
        session.push_message(Speaker::User, answer);
        session.interview = InterviewState::TurnComplete { ticket };

        Ok(PendingAnswer {
            ticket,
            request: InterviewAnswerRequest {
                session_id: session.session_id.clone(),
                question,
                answer: answer.to_string(),
                context: session.interview_context.as_str().to_string(),
            },
        })
    }

    /// Records rating and feedback, then either ends the interview or adopts
    /// the next question. A failed call releases the turn for another attempt.
    pub fn complete_answer(
        &self,
        session: &mut SessionState,
        ticket: TurnTicket,
        result: Result<InterviewAnswerResponse, GatewayError>,
    ) -> Result<InterviewStep, AppError> {
        if session.interview != (InterviewState::TurnComplete { ticket }) {
            warn!("Discarding answer result for stale turn {}", ticket.turn);
            return Err(AppError::Stale(format!("answer result for turn {}", ticket.turn)));
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!("Answer submission failed: {e}");
                if !matches!(e, GatewayError::Api { .. }) {
                    session.push_message(Speaker::Bot, ANSWER_FAILURE_MESSAGE);
                }
                session.interview = InterviewState::AwaitingAnswer { ticket };
                return Err(e.into());
            }
        };

        let rating = normalize_rating(response.rating);
        let question = session.current_question.clone().unwrap_or_default();
        session.interview_ratings.push(rating);
        // Feedback is kept for the report only, never echoed into the conversation.
        session.feedback_log.push(FeedbackEntry {
            question,
            feedback: response
                .feedback
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| MISSING_FEEDBACK.to_string()),
        });
        session.interview_turn_index += 1;
        debug!(
            "Turn {} recorded with rating {rating}",
            session.interview_turn_index
        );

        if session.interview_turn_index >= session.interview_limit {
            info!(
                "Interview complete after {} turns",
                session.interview_turn_index
            );
            session.interview = InterviewState::InterviewDone;
            session.current_question = None;
            session.phase = Phase::Report;
            session.push_message(Speaker::Bot, COMPLETION_MESSAGE);
            return Ok(InterviewStep::Done);
        }

        let next = usable_question(response.next_question);
        Ok(InterviewStep::Question(self.adopt_question(session, next)))
    }

    // ────────────────────────────────────────────────────────────────────────
    // Helpers
    // ────────────────────────────────────────────────────────────────────────

    fn adopt_question(&self, session: &mut SessionState, question: String) -> TurnTicket {
        let ticket = TurnTicket {
            flow: session.flow_id,
            turn: session.interview_turn_index,
        };
        session.push_message(Speaker::Bot, question.clone());
        self.voice.speak(&question);
        session.current_question = Some(question);
        session.interview = InterviewState::AwaitingAnswer { ticket };
        ticket
    }
}

/// Ticket for the pending turn, if an answer is expected.
pub fn current_ticket(session: &SessionState) -> Option<TurnTicket> {
    match session.interview {
        InterviewState::AwaitingAnswer { ticket } => Some(ticket),
        _ => None,
    }
}

/// Title shown above the conversation, e.g. "HR Interview - Q1/2".
pub fn turn_label(session: &SessionState) -> String {
    format!(
        "{} Interview - Q{}/{}",
        session.interview_context.label(),
        (session.interview_turn_index + 1).min(session.interview_limit),
        session.interview_limit
    )
}

fn normalize_rating(rating: Option<i64>) -> u32 {
    match rating {
        None => DEFAULT_RATING,
        Some(r) if r < MIN_RATING as i64 || r > MAX_RATING as i64 => {
            warn!("Rating {r} out of range, clamping");
            r.clamp(MIN_RATING as i64, MAX_RATING as i64) as u32
        }
        Some(r) => r as u32,
    }
}

fn usable_question(candidate: Option<String>) -> String {
    match candidate.map(|q| q.trim().to_string()) {
        Some(q) if !q.is_empty() && q != "undefined" && q != "null" => q,
        _ => {
            warn!("Service returned no usable question, using fallback");
            FALLBACK_QUESTION.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::gateway::mock::{answer, Scripted, ScriptedGateway};
    use crate::models::session::InterviewContext;
    use crate::voice::testing::RecordingVoice;

    fn setup(
        context: InterviewContext,
    ) -> (
        InterviewOrchestrator,
        Arc<ScriptedGateway>,
        Arc<RecordingVoice>,
        SessionState,
    ) {
        let gateway = Arc::new(ScriptedGateway::new());
        let voice = Arc::new(RecordingVoice::default());
        let orchestrator = InterviewOrchestrator::new(gateway.clone(), voice.clone());
        let mut session = SessionState::new();
        session.phase = Phase::Interview;
        session.interview_limit = context.turn_limit();
        session.interview_context = context;
        (orchestrator, gateway, voice, session)
    }

    async fn started(orchestrator: &InterviewOrchestrator, session: &mut SessionState) -> TurnTicket {
        match orchestrator.start(session).await.unwrap() {
            InterviewStep::Question(ticket) => ticket,
            InterviewStep::Done => panic!("interview ended at start"),
        }
    }

    #[tokio::test]
    async fn test_start_sets_question_and_speaks_it() {
        let (orch, gateway, voice, mut session) = setup(InterviewContext::Domain("AI".into()));
        let ticket = started(&orch, &mut session).await;

        assert_eq!(ticket.turn, 0);
        assert_eq!(session.current_question.as_deref(), Some("Tell me about yourself."));
        assert_eq!(voice.spoken.lock().unwrap().len(), 1);
        let requests = gateway.start_requests.lock().unwrap();
        assert_eq!(requests[0].context, "AI");
        assert_eq!(requests[0].session_id, None);
    }

    #[tokio::test]
    async fn test_start_adopts_minted_session_id() {
        let (orch, gateway, _, mut session) = setup(InterviewContext::Common);
        gateway.push_start(Scripted::Ok(InterviewStartResponse {
            question: "Why should we hire you?".into(),
            session_id: Some("minted".into()),
        }));
        started(&orch, &mut session).await;
        assert_eq!(session.session_id.as_deref(), Some("minted"));
    }

    #[tokio::test]
    async fn test_start_failure_leaves_placeholder_and_stays_startable() {
        let (orch, gateway, _, mut session) = setup(InterviewContext::Common);
        gateway.push_start(Scripted::TransportError);

        assert!(orch.start(&mut session).await.is_err());
        assert_eq!(session.interview, InterviewState::AwaitingStart);
        assert_eq!(session.conversation.last().unwrap().text, START_FAILURE_MESSAGE);
        assert!(session.current_question.is_none());

        // manual recovery
        started(&orch, &mut session).await;
        assert!(session.current_question.is_some());
    }

    #[tokio::test]
    async fn test_domain_interview_done_after_two_answers() {
        let (orch, gateway, _, mut session) = setup(InterviewContext::Domain("AI".into()));
        let t0 = started(&orch, &mut session).await;

        let step = orch.submit_answer(&mut session, t0, "Search and learning").await.unwrap();
        let InterviewStep::Question(t1) = step else {
            panic!("ended too early")
        };
        assert_eq!(t1.turn, 1);

        let step = orch.submit_answer(&mut session, t1, "Heuristics").await.unwrap();
        assert_eq!(step, InterviewStep::Done);
        assert_eq!(session.interview, InterviewState::InterviewDone);
        assert_eq!(session.phase, Phase::Report);
        assert_eq!(session.feedback_log.len(), 2);
        assert_eq!(session.interview_turn_index, 2);
        assert_eq!(gateway.answer_count(), 2);
        assert_eq!(session.conversation.last().unwrap().text, COMPLETION_MESSAGE);
    }

    #[tokio::test]
    async fn test_resume_interview_waits_until_fifth_answer() {
        let (orch, _, _, mut session) = setup(InterviewContext::Resume);
        let mut ticket = started(&orch, &mut session).await;

        for i in 0..4 {
            match orch.submit_answer(&mut session, ticket, "an answer").await.unwrap() {
                InterviewStep::Question(next) => ticket = next,
                InterviewStep::Done => panic!("done after {} answers", i + 1),
            }
        }
        assert!(matches!(session.interview, InterviewState::AwaitingAnswer { .. }));

        let step = orch.submit_answer(&mut session, ticket, "last one").await.unwrap();
        assert_eq!(step, InterviewStep::Done);
        assert_eq!(session.interview_ratings.len(), 5);
    }

    #[tokio::test]
    async fn test_empty_answer_rejected_without_network() {
        let (orch, gateway, _, mut session) = setup(InterviewContext::Common);
        let ticket = started(&orch, &mut session).await;
        let before = session.conversation.len();

        let err = orch.submit_answer(&mut session, ticket, "   \n").await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(gateway.answer_count(), 0);
        assert_eq!(session.interview_turn_index, 0);
        assert_eq!(session.conversation.len(), before);
        assert_eq!(session.interview, InterviewState::AwaitingAnswer { ticket });
    }

    #[tokio::test]
    async fn test_rating_default_and_feedback_not_echoed() {
        let (orch, gateway, _, mut session) = setup(InterviewContext::Resume);
        gateway.push_answer(Scripted::Ok(answer(None, "Use STAR.", "Next?")));
        let ticket = started(&orch, &mut session).await;

        orch.submit_answer(&mut session, ticket, "I led a team").await.unwrap();

        assert_eq!(session.interview_ratings, vec![DEFAULT_RATING]);
        assert_eq!(session.feedback_log[0].question, "Tell me about yourself.");
        assert_eq!(session.feedback_log[0].feedback, "Use STAR.");
        assert!(session.conversation.iter().all(|m| m.text != "Use STAR."));
        let texts: Vec<_> = session.conversation.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["Tell me about yourself.", "I led a team", "Next?"]);
    }

    #[tokio::test]
    async fn test_out_of_range_rating_is_clamped() {
        let (orch, gateway, _, mut session) = setup(InterviewContext::Resume);
        gateway.push_answer(Scripted::Ok(answer(Some(42), "wow", "Next?")));
        let ticket = started(&orch, &mut session).await;
        orch.submit_answer(&mut session, ticket, "answer").await.unwrap();
        assert_eq!(session.interview_ratings, vec![MAX_RATING]);
    }

    #[tokio::test]
    async fn test_blank_next_question_uses_fallback() {
        let (orch, gateway, _, mut session) = setup(InterviewContext::Resume);
        gateway.push_answer(Scripted::Ok(answer(Some(6), "ok", "undefined")));
        let ticket = started(&orch, &mut session).await;
        orch.submit_answer(&mut session, ticket, "answer").await.unwrap();
        assert_eq!(session.current_question.as_deref(), Some(FALLBACK_QUESTION));
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_turn_open() {
        let (orch, gateway, _, mut session) = setup(InterviewContext::Resume);
        gateway.push_answer(Scripted::TransportError);
        let ticket = started(&orch, &mut session).await;

        let err = orch.submit_answer(&mut session, ticket, "answer").await.unwrap_err();

        assert!(matches!(err, AppError::Transport(_)));
        assert_eq!(session.interview_turn_index, 0);
        assert!(session.interview_ratings.is_empty());
        assert_eq!(session.conversation.last().unwrap().text, ANSWER_FAILURE_MESSAGE);
        assert_eq!(session.interview, InterviewState::AwaitingAnswer { ticket });

        orch.submit_answer(&mut session, ticket, "answer again").await.unwrap();
        assert_eq!(session.interview_turn_index, 1);
    }

    #[tokio::test]
    async fn test_service_error_surfaces_and_keeps_turn() {
        let (orch, gateway, _, mut session) = setup(InterviewContext::Resume);
        gateway.push_answer(Scripted::ServiceError("Session not found".into()));
        let ticket = started(&orch, &mut session).await;

        let err = orch.submit_answer(&mut session, ticket, "answer").await.unwrap_err();

        assert_eq!(err.user_message(), "Session not found");
        assert_eq!(session.interview, InterviewState::AwaitingAnswer { ticket });
    }

    #[tokio::test]
    async fn test_second_submission_for_same_turn_is_stale() {
        let (orch, gateway, _, mut session) = setup(InterviewContext::Resume);
        let ticket = started(&orch, &mut session).await;

        let pending = orch.begin_answer(&mut session, ticket, "typed").unwrap();
        let err = orch.begin_answer(&mut session, ticket, "spoken").unwrap_err();
        assert!(matches!(err, AppError::Stale(_)));

        let result = gateway.interview_answer(&pending.request).await;
        orch.complete_answer(&mut session, pending.ticket, result).unwrap();
        assert_eq!(session.interview_turn_index, 1);
        assert_eq!(gateway.answer_count(), 1);

        // the old ticket is now behind the current turn
        let err = orch.submit_answer(&mut session, ticket, "late").await.unwrap_err();
        assert!(matches!(err, AppError::Stale(_)));
    }

    #[tokio::test]
    async fn test_result_after_reset_is_discarded() {
        let (orch, gateway, _, mut session) = setup(InterviewContext::Resume);
        let ticket = started(&orch, &mut session).await;
        let pending = orch.begin_answer(&mut session, ticket, "answer").unwrap();

        session.reset();
        let result = gateway.interview_answer(&pending.request).await;
        let err = orch.complete_answer(&mut session, pending.ticket, result).unwrap_err();

        assert!(matches!(err, AppError::Stale(_)));
        assert!(session.interview_ratings.is_empty());
        assert!(session.feedback_log.is_empty());
        assert_eq!(session.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn test_start_result_after_reset_is_discarded() {
        let (orch, gateway, _, mut session) = setup(InterviewContext::Common);
        let pending = orch.prepare_start(&session).unwrap();
        session.reset();
        let result = gateway.interview_start(&pending.request).await;
        assert!(orch.apply_start(&mut session, pending.flow, result).is_err());
        assert!(session.current_question.is_none());
    }

    #[tokio::test]
    async fn test_voice_answer_uses_same_path() {
        let gateway = Arc::new(ScriptedGateway::new());
        let voice = Arc::new(RecordingVoice::with_transcripts(&["spoken answer"]));
        let orch = InterviewOrchestrator::new(gateway.clone(), voice.clone());
        let mut session = SessionState::new();
        session.phase = Phase::Interview;
        session.interview_limit = 2;
        session.interview_context = InterviewContext::Common;
        let ticket = started(&orch, &mut session).await;

        orch.submit_voice_answer(&mut session, ticket).await.unwrap();

        assert_eq!(gateway.answer_requests.lock().unwrap()[0].answer, "spoken answer");
        assert_eq!(voice.spoken.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_answer_before_start_is_invalid() {
        let (orch, _, _, mut session) = setup(InterviewContext::Common);
        let ticket = TurnTicket {
            flow: session.flow_id,
            turn: 0,
        };
        let err = orch.submit_answer(&mut session, ticket, "hi").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState { .. }));
    }

    #[test]
    fn test_turn_label() {
        let mut session = SessionState::new();
        session.interview_context = InterviewContext::Common;
        session.interview_limit = 2;
        assert_eq!(turn_label(&session), "HR Interview - Q1/2");
        session.interview_turn_index = 1;
        assert_eq!(turn_label(&session), "HR Interview - Q2/2");
    }

    #[test]
    fn test_current_ticket_only_when_awaiting_answer() {
        let session = SessionState::new();
        assert!(current_ticket(&session).is_none());
    }
}
