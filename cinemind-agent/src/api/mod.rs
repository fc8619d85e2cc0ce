//! HTTP API handlers for cinemind-agent

pub mod health;
pub mod movies;
pub mod rating;
pub mod rating_jobs;
pub mod reviews;
pub mod ui;

pub use health::health_routes;
pub use movies::movie_routes;
pub use rating::rating_routes;
pub use rating_jobs::job_routes;
pub use reviews::review_routes;
pub use ui::ui_routes;
