//! Report Builder: turns the accumulated session into a summary and, through
//! the gateway, into a downloadable artifact. Never mutates the session.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::gateway::{ExportRequest, Gateway, SaveResultsRequest};
use crate::interview::DEFAULT_RATING;
use crate::models::session::{FeedbackEntry, Scores, SessionState};
use crate::models::user::{ResultRecord, User};
use crate::report::recommendations::{level_for, resources_for, Level, Resource};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    /// Rounded mean of the turn ratings, `DEFAULT_RATING` when none were recorded.
    pub interview_score: u32,
    /// Sum over every quiz category that ran.
    pub mcq_score: u32,
    pub scores: Scores,
    /// "Resume", "Common" or the domain name.
    pub context: String,
    pub feedback_entries: Vec<FeedbackEntry>,
    pub level: Level,
    pub recommendations: Vec<Resource>,
}

impl ReportSummary {
    /// Feedback rendered as "Q: ... | Feedback: ..." lines, the export wire format.
    pub fn feedback_lines(&self) -> Vec<String> {
        self.feedback_entries.iter().map(ToString::to_string).collect()
    }
}

/// Pure summary of `session`; calling it twice yields the same value.
pub fn finalize(session: &SessionState) -> ReportSummary {
    let interview_score = mean_rating(&session.interview_ratings);
    let level = level_for(interview_score);
    ReportSummary {
        interview_score,
        mcq_score: session.scores.total(),
        scores: session.scores,
        context: session.interview_context.as_str().to_string(),
        feedback_entries: session.feedback_log.clone(),
        level,
        recommendations: resources_for(level),
    }
}

fn mean_rating(ratings: &[u32]) -> u32 {
    if ratings.is_empty() {
        return DEFAULT_RATING;
    }
    let sum: u32 = ratings.iter().sum();
    (sum as f64 / ratings.len() as f64).round() as u32
}

#[derive(Clone)]
pub struct ReportBuilder {
    gateway: Arc<dyn Gateway>,
    report_dir: PathBuf,
}

impl ReportBuilder {
    pub fn new(gateway: Arc<dyn Gateway>, report_dir: impl Into<PathBuf>) -> Self {
        Self {
            gateway,
            report_dir: report_dir.into(),
        }
    }

    /// Requests the report artifact and saves it under the report directory.
    /// Failures leave the session untouched and are not retried.
    pub async fn export(
        &self,
        session: &SessionState,
        user: Option<&User>,
    ) -> Result<PathBuf, AppError> {
        let user = user.ok_or(AppError::SessionRequired)?;
        let summary = finalize(session);
        let request = ExportRequest {
            user_id: user.user_id.clone(),
            // Non-domain flows export under "Resume".
            domain: session.domain().unwrap_or("Resume").to_string(),
            score_mcq: summary.mcq_score,
            score_interview: summary.interview_score,
            feedback: summary.feedback_lines(),
        };

        let bytes = self.gateway.export_report(&request).await.map_err(|e| {
            warn!("Export request failed: {e}");
            AppError::Export(e.to_string())
        })?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let path = save_artifact(&self.report_dir, &stamp, &bytes).await?;
        info!("Report saved to {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    /// Stores the finished session in the user's results history.
    pub async fn save_results(
        &self,
        session: &SessionState,
        user: Option<&User>,
    ) -> Result<(), AppError> {
        let user = user.ok_or(AppError::SessionRequired)?;
        let summary = finalize(session);
        let request = SaveResultsRequest {
            user_id: user.user_id.clone(),
            scores: summary.scores,
            feedback: summary.feedback_lines(),
            responses: summary.feedback_entries,
        };
        self.gateway.save_results(&request).await?;
        Ok(())
    }

    pub async fn history(&self) -> Result<Vec<ResultRecord>, AppError> {
        Ok(self.gateway.fetch_results().await?)
    }
}

const MAX_NAME_ATTEMPTS: u32 = 100;

fn report_path(dir: &Path, stamp: &str, attempt: u32) -> PathBuf {
    if attempt == 0 {
        dir.join(format!("Interview_Report_{stamp}.pdf"))
    } else {
        dir.join(format!("Interview_Report_{stamp}_{attempt}.pdf"))
    }
}

/// Writes `bytes` to the first free `Interview_Report_<stamp>[_n].pdf`; an
/// existing report is never overwritten.
async fn save_artifact(dir: &Path, stamp: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
    let write_error =
        |path: &Path, e: io::Error| AppError::Export(format!("Failed to write {}: {e}", path.display()));

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = report_path(dir, stamp, attempt);
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(write_error(&path, e)),
        };
        file.write_all(bytes).await.map_err(|e| write_error(&path, e))?;
        file.flush().await.map_err(|e| write_error(&path, e))?;
        return Ok(path);
    }
    Err(AppError::Export(format!(
        "No free report file name for {stamp} in {}",
        dir.display()
    )))
}
