//! Entitlement (full version) status.
//!
//! Purchases themselves are tracked elsewhere; this trait only exposes the
//! resulting status and a subscription that pushes changes.

use tokio::sync::watch;

/// Source of the "full version unlocked" status.
pub trait EntitlementProvider: Send + Sync {
    /// Current status.
    fn is_full_version(&self) -> bool;

    /// Subscribes to status changes.
    ///
    /// The receiver is a subscription handle: dropping it unsubscribes.
    fn subscribe(&self) -> watch::Receiver<bool>;
}
