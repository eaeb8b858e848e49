//! In-process entitlement source.

use tokio::sync::watch;
use tunesmith_core::entitlement::EntitlementProvider;

/// Entitlement status held in a watch channel.
///
/// Whatever tracks purchases calls [`set_full_version`](Self::set_full_version);
/// subscribers see the change immediately.
#[derive(Clone)]
pub struct WatchEntitlementProvider {
    sender: watch::Sender<bool>,
}

impl WatchEntitlementProvider {
    pub fn new(is_full_version: bool) -> Self {
        let (sender, _) = watch::channel(is_full_version);
        Self { sender }
    }

    /// Publishes a new status. Unchanged values do not wake subscribers.
    pub fn set_full_version(&self, is_full_version: bool) {
        let changed = self.sender.send_if_modified(|current| {
            let changed = *current != is_full_version;
            *current = is_full_version;
            changed
        });
        if changed {
            tracing::info!(is_full_version, "Entitlement changed");
        }
    }
}

impl EntitlementProvider for WatchEntitlementProvider {
    fn is_full_version(&self) -> bool {
        *self.sender.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}
