//! Usage data: rate-limit snapshots read from agent session logs.
//!
//! The newest session log is scanned for its latest `token_count` event and
//! turned into a [`RateLimitSnapshot`] with derived reset/elapsed information.

pub mod fetcher;
pub mod format;
pub mod parser;
pub mod types;

pub use fetcher::{SessionLogSource, SnapshotSource};
pub use format::{format_token_count, format_tokens};
pub use types::{FetchResult, RateLimitSnapshot, TokenCount, UsageError, UsageWindow};
