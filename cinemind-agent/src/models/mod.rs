//! Data models for cinemind-agent

pub mod movie;
pub mod rating;
pub mod rating_job;
pub mod review_request;

pub use movie::{year_from_release_date, MovieInfo};
pub use rating::{
    AggregateRatingResult, ConfidenceLevel, RatingBreakdown, Review, SentimentDistribution,
    SentimentLabel, NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD,
};
pub use rating_job::{JobState, JobStatus, JobStep, RatingJob, StateTransition, TransitionRejected};
pub use review_request::{BatchReviewRequest, BatchReviewResponse, ReviewRequest, ReviewResponse};
