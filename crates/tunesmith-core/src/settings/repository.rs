//! Settings repository traits.

use async_trait::async_trait;

use crate::error::Result;

/// Daily usage counter consulted by the quota check.
///
/// The lifecycle only reads it; whoever accepts a submission (see the
/// counting backend) increments it.
#[async_trait]
pub trait UsageCounter: Send + Sync {
    /// Number of generations started today.
    async fn generations_used_today(&self) -> Result<u32>;

    /// Records one accepted generation for today.
    async fn record_generation(&self) -> Result<()>;
}

/// Durable "long-wait notice already shown" flag. Defaults to false.
#[async_trait]
pub trait LongWaitNoticeStore: Send + Sync {
    async fn has_shown_long_wait_notice(&self) -> Result<bool>;

    /// Sets the flag to true. Calling it again is a no-op.
    async fn mark_long_wait_notice_shown(&self) -> Result<()>;
}
