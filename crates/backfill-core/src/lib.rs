//! Backfill Core - Common infrastructure for entity enrichment
//!
//! This crate provides the pieces every provider adapter and the batch
//! engine share: a retrying JSON-over-HTTP client, the backoff and pacing
//! policies, logging, progress reporting and the shutdown flag.

pub mod error;
pub mod http;
pub mod logging;
pub mod pacing;
pub mod progress;
pub mod retry;
pub mod shutdown;

// Re-exports for convenience
pub use error::HttpError;
pub use http::{HttpClient, HttpConfig, RequestOptions, SHARED_RUNTIME};
pub use logging::{IndicatifLogger, init_logging};
pub use pacing::{Pacer, RecordingSleeper, Sleeper, ThreadSleeper};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use retry::{RETRYABLE_STATUSES, backoff_duration, is_retryable_status};
pub use shutdown::shutdown_flag;
