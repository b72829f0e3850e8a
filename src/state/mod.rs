//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RunState`: Lifecycle of one crawl (not started, running, completed, timed out)
//! - `CrawlRun`: Per-invocation accumulator of the URL list and its outcomes

mod crawl_run;
mod run_state;

// Re-export main types
pub use crawl_run::CrawlRun;
pub use run_state::RunState;
