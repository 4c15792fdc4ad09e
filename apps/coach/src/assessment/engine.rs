//! Runs a quiz category over the session: sample, present one question at a
//! time, count correct answers, then decide what follows.
//!
//! Transition policy on `CategoryDone`: a finished `Tech` category chains into
//! `Aptitude`; anything else ends the MCQ phase and hands over to the interview.

use std::sync::Arc;

use tracing::info;

use crate::assessment::McqState;
use crate::bank::QuestionBank;
use crate::errors::AppError;
use crate::models::session::{Category, Phase, SessionState};

/// What the caller should show after an engine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McqStep {
    /// `session.current_mcq()` holds the question to present.
    Question,
    /// The previous category finished and this one has begun.
    Chained(Category),
    /// The MCQ phase is over; the session is now in `Phase::Interview`.
    Finished,
}

#[derive(Clone)]
pub struct AssessmentEngine {
    bank: Arc<QuestionBank>,
}

impl AssessmentEngine {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self { bank }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Starts `category`: resamples the active questions and shows the first.
    pub fn begin_category(
        &self,
        session: &mut SessionState,
        category: Category,
    ) -> Result<McqStep, AppError> {
        if session.mcq == McqState::QuestionShown
            || matches!(session.phase, Phase::Interview | Phase::Report)
        {
            return Err(AppError::invalid_state(
                "begin a quiz category",
                (session.phase, session.mcq),
            ));
        }

        let questions = self
            .bank
            .sample(category.pool_key(), category.sample_size());
        info!(
            "Starting MCQ category '{}' with {} questions",
            category.pool_key(),
            questions.len()
        );

        session.phase = Phase::AssessmentMcq;
        session.active_questions = questions;
        session.mcq_index = 0;
        session.mcq_category = Some(category);

        if session.active_questions.is_empty() {
            session.mcq = McqState::CategoryDone;
            return self.finish_category(session);
        }
        session.mcq = McqState::QuestionShown;
        Ok(McqStep::Question)
    }

    /// Records the answer to the shown question and advances.
    pub fn submit_answer(
        &self,
        session: &mut SessionState,
        selected: usize,
    ) -> Result<McqStep, AppError> {
        if session.phase != Phase::AssessmentMcq || session.mcq != McqState::QuestionShown {
            return Err(AppError::invalid_state(
                "answer a quiz question",
                (session.phase, session.mcq),
            ));
        }
        let (Some(question), Some(category)) = (
            session.active_questions.get(session.mcq_index),
            session.mcq_category.as_ref(),
        ) else {
            return Err(AppError::invalid_state(
                "answer a quiz question",
                "no active question",
            ));
        };

        if selected >= question.options().len() {
            return Err(AppError::Validation(format!(
                "Option {} does not exist; choose 1-{}",
                selected + 1,
                question.options().len()
            )));
        }

        if question.is_correct(selected) {
            session.scores.increment(category.slot());
        }
        session.mcq_index += 1;

        if session.mcq_index >= session.active_questions.len() {
            session.mcq = McqState::CategoryDone;
            return self.finish_category(session);
        }
        Ok(McqStep::Question)
    }

    fn finish_category(&self, session: &mut SessionState) -> Result<McqStep, AppError> {
        let finished = session.mcq_category.clone();
        info!(
            "MCQ category {:?} done, scores so far: {:?}",
            finished, session.scores
        );

        if finished == Some(Category::Tech) {
            return match self.begin_category(session, Category::Aptitude)? {
                McqStep::Question => Ok(McqStep::Chained(Category::Aptitude)),
                other => Ok(other),
            };
        }

        session.phase = Phase::Interview;
        Ok(McqStep::Finished)
    }
}
