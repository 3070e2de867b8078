//! Kernel module - worker infrastructure and dependencies.

pub mod ai;
pub mod deps;
pub mod retry;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use ai::GeminiAI;
pub use deps::{PgInsightStore, ServerDeps};
pub use retry::{with_retry, with_retry_if, RetryPolicy};
pub use scheduled_tasks::start_scheduler;
pub use test_dependencies::{MockAI, MockInsightStore};
pub use traits::*;
