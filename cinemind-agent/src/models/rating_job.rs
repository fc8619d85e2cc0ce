//! Rating job state machine
//!
//! A job moves PENDING → PROCESSING(step, percent) → … → COMPLETED | FAILED.
//! PENDING → FAILED is allowed; terminal states never change again, and the
//! generated review is only visible once the job is COMPLETED.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ReviewRequest, ReviewResponse};

/// Pipeline step reported while a job is processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStep {
    FetchingMetadata,
    FetchingReviews,
    AnalyzingSentiment,
    ComposingRating,
    GeneratingNarrative,
}

impl JobStep {
    /// User-facing step label
    pub fn label(&self) -> &'static str {
        match self {
            JobStep::FetchingMetadata => "获取电影信息",
            JobStep::FetchingReviews => "获取观众评论",
            JobStep::AnalyzingSentiment => "分析评论情感",
            JobStep::ComposingRating => "计算综合评分",
            JobStep::GeneratingNarrative => "生成影评内容",
        }
    }

    /// Progress reached when the step starts
    pub fn percent(&self) -> u8 {
        match self {
            JobStep::FetchingMetadata => 10,
            JobStep::FetchingReviews => 30,
            JobStep::AnalyzingSentiment => 60,
            JobStep::ComposingRating => 70,
            JobStep::GeneratingNarrative => 80,
        }
    }
}

/// Job state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Processing { step: JobStep, percent: u8 },
    Completed { result: Box<ReviewResponse> },
    Failed { error: String },
}

impl JobState {
    pub fn name(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Processing { .. } => "processing",
            JobState::Completed { .. } => "completed",
            JobState::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed { .. } | JobState::Failed { .. })
    }
}

/// Record of an applied transition
#[derive(Debug, Clone, Serialize)]
pub struct StateTransition {
    pub job_id: Uuid,
    pub old_state: &'static str,
    pub new_state: &'static str,
    pub transitioned_at: DateTime<Utc>,
}

/// Why a transition was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRejected {
    /// Job already completed or failed
    AlreadyTerminal,
    /// Target state not reachable from the current one
    NotAllowed,
}

/// One review generation job (in-memory)
#[derive(Debug, Clone)]
pub struct RatingJob {
    pub job_id: Uuid,
    pub request: ReviewRequest,
    pub state: JobState,
    /// Last progress reported, kept when the job fails
    pub percent: u8,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RatingJob {
    pub fn new(request: ReviewRequest) -> Self {
        let now = Utc::now();
        Self {
            job_id: Uuid::new_v4(),
            request,
            state: JobState::Pending,
            percent: 0,
            submitted_at: now,
            updated_at: now,
            finished_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Apply a transition if the state machine allows it
    pub fn transition_to(&mut self, new_state: JobState) -> Result<StateTransition, TransitionRejected> {
        if self.state.is_terminal() {
            return Err(TransitionRejected::AlreadyTerminal);
        }
        let allowed = match (&self.state, &new_state) {
            (_, JobState::Pending) => false,
            (JobState::Pending, JobState::Completed { .. }) => false,
            (JobState::Processing { step: current, .. }, JobState::Processing { step: next, .. }) => {
                next >= current
            }
            _ => true,
        };
        if !allowed {
            return Err(TransitionRejected::NotAllowed);
        }

        let now = Utc::now();
        let transition = StateTransition {
            job_id: self.job_id,
            old_state: self.state.name(),
            new_state: new_state.name(),
            transitioned_at: now,
        };

        match &new_state {
            JobState::Processing { percent, .. } => self.percent = *percent,
            JobState::Completed { .. } => {
                self.percent = 100;
                self.finished_at = Some(now);
            }
            JobState::Failed { .. } => self.finished_at = Some(now),
            JobState::Pending => {}
        }
        self.state = new_state;
        self.updated_at = now;

        Ok(transition)
    }

    /// Enter a pipeline step
    pub fn advance(&mut self, step: JobStep) -> Result<StateTransition, TransitionRejected> {
        self.transition_to(JobState::Processing {
            step,
            percent: step.percent(),
        })
    }

    pub fn complete(&mut self, result: ReviewResponse) -> Result<StateTransition, TransitionRejected> {
        self.transition_to(JobState::Completed {
            result: Box::new(result),
        })
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<StateTransition, TransitionRejected> {
        self.transition_to(JobState::Failed { error: error.into() })
    }

    /// Poll snapshot (never includes the result body)
    pub fn status(&self) -> JobStatus {
        let (step, error) = match &self.state {
            JobState::Processing { step, .. } => (Some(*step), None),
            JobState::Failed { error } => (None, Some(error.clone())),
            _ => (None, None),
        };
        JobStatus {
            job_id: self.job_id,
            title: self.request.title.clone(),
            state: self.state.name(),
            step,
            label: step.map(|s| s.label()),
            percent: self.percent,
            error,
            submitted_at: self.submitted_at,
            updated_at: self.updated_at,
            finished_at: self.finished_at,
        }
    }
}

/// Job status as returned by polling
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub job_id: Uuid,
    pub title: String,
    pub state: &'static str,
    pub step: Option<JobStep>,
    pub label: Option<&'static str>,
    pub percent: u8,
    pub error: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
