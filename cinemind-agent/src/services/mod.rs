//! Service modules for the review agent
//!
//! Rating core: sentiment scorer → review aggregator → rating composer.
//! Adapters: TMDB catalog, language model. Orchestration: review agent and
//! job registry.

pub mod job_registry;
pub mod llm_client;
pub mod rating_composer;
pub mod review_agent;
pub mod review_aggregator;
pub mod review_prompt;
pub mod sentiment_analyzer;
pub mod tmdb_client;

pub use job_registry::{JobHandle, JobRegistry};
pub use llm_client::{ChatMessage, LlmClient, LlmError, NarrativeGenerator};
pub use rating_composer::RatingComposer;
pub use review_agent::{fallback_rating, AgentError, RatingOutcome, ReviewAgent};
pub use review_aggregator::{ReviewAggregator, ReviewAnalysis, ReviewExemplar};
pub use sentiment_analyzer::{Lexicon, SentimentAnalyzer, SentimentResult};
pub use tmdb_client::{MovieCatalog, TmdbClient, TmdbError};
