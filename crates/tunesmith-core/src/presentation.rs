//! Presentation models.
//!
//! The flags a view renders from and the navigation signals it reacts to.
//! Neither carries logic; the generation lifecycle is the only writer.

use serde::{Deserialize, Serialize};

use crate::generation::{AlertKind, GeneratedAudio};

/// Observable flags read by the generation screen.
///
/// # Fields
///
/// * `show_loader` - A request is in flight and nothing else is covering it.
/// * `show_long_wait_notice` - The first-ever timeout notice is up.
/// * `show_no_internet_alert` / `show_server_alert` - One-shot failure alerts.
/// * `is_result_ready` - The result screen should be pushed.
/// * `is_empty_prompt_error` - The prompt field should be highlighted.
/// * `is_entitled_full_version` - Mirrors the entitlement subscription.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PresentationState {
    pub show_loader: bool,
    pub show_long_wait_notice: bool,
    pub show_no_internet_alert: bool,
    pub show_server_alert: bool,
    pub is_result_ready: bool,
    pub is_empty_prompt_error: bool,
    pub is_entitled_full_version: bool,
}

impl PresentationState {
    pub fn new(is_entitled_full_version: bool) -> Self {
        Self {
            is_entitled_full_version,
            ..Self::default()
        }
    }

    /// Whether a success may still be shown: something is waiting for it.
    pub fn is_waiting_for_result(&self) -> bool {
        self.show_loader || self.show_long_wait_notice
    }

    /// Clears the result and error flags left by the previous submission.
    ///
    /// The loader and long-wait notice belong to the in-flight run and are
    /// handled when a new run actually starts.
    pub fn clear_outcome_flags(&mut self) {
        self.is_result_ready = false;
        self.show_no_internet_alert = false;
        self.show_server_alert = false;
        self.is_empty_prompt_error = false;
    }

    /// Flags for a freshly started run: loader up, nothing else pending.
    pub fn start_waiting(&mut self) {
        self.clear_outcome_flags();
        self.show_long_wait_notice = false;
        self.show_loader = true;
    }

    /// Takes down the loader and the long-wait notice.
    pub fn clear_waiting(&mut self) {
        self.show_loader = false;
        self.show_long_wait_notice = false;
    }

    pub fn raise_alert(&mut self, alert: AlertKind) {
        match alert {
            AlertKind::NoInternet => self.show_no_internet_alert = true,
            AlertKind::Server => self.show_server_alert = true,
        }
    }
}

/// Why an upgrade offer is presented.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OfferReason {
    QuotaLimit,
}

/// Navigation requests emitted to the navigation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavigationSignal {
    /// Push the result screen for this audio.
    NavigateToResult { audio: GeneratedAudio },
    /// Leave the form for the library; generation continues in the background.
    NavigateToLibraryBackground,
    /// Show the upsell instead of generating.
    PresentUpgradeOffer { reason: OfferReason },
}
