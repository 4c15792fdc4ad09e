// Assessment Engine: the multiple-choice phase.
// Fixed sequencing: tech -> apt -> interview; a domain category runs alone.

pub mod engine;

pub use engine::{AssessmentEngine, McqStep};

use serde::{Deserialize, Serialize};

/// Position within the current quiz category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum McqState {
    CategoryStart,
    QuestionShown,
    CategoryDone,
}
