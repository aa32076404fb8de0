//! UI-side consumer of `permission-error` events.
//!
//! A [`PermissionErrorListener`] is mounted when the application shell comes
//! up and unmounted when it goes away. While mounted it forwards every
//! permission error either to the developer [`ErrorOverlay`] or to the log
//! sink, depending on the configured [`Environment`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use pulsecheck_event_bus::{EventHub, EventName, SubscriptionId};
use pulsecheck_types::{AppConfig, Environment, PermissionError};

#[derive(Debug, Clone)]
pub struct OverlayEntry {
    pub error: PermissionError,
    pub received_at: DateTime<Utc>,
}

/// Bounded list of recent permission errors shown to developers.
///
/// Clones share the same entries.
#[derive(Clone)]
pub struct ErrorOverlay {
    entries: Arc<Mutex<VecDeque<OverlayEntry>>>,
    max_entries: usize,
}

impl ErrorOverlay {
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(max_entries))),
            max_entries,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<OverlayEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, error: PermissionError) {
        let mut entries = self.lock();
        while entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(OverlayEntry {
            error,
            received_at: Utc::now(),
        });
    }

    /// Entries oldest first
    pub fn entries(&self) -> Vec<OverlayEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<OverlayEntry> {
        self.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn dismiss_all(&self) {
        self.lock().clear();
    }
}

/// Where delivered errors end up
#[derive(Clone)]
pub enum Presentation {
    Overlay(ErrorOverlay),
    LogSink,
}

impl Presentation {
    pub fn for_config(config: &AppConfig) -> Self {
        match config.environment {
            Environment::Development => {
                Presentation::Overlay(ErrorOverlay::new(config.overlay.max_entries))
            }
            Environment::Production => Presentation::LogSink,
        }
    }

    fn present(&self, error: &PermissionError) {
        match self {
            Presentation::Overlay(overlay) => {
                log::warn!("{}", error);
                overlay.push(error.clone());
            }
            Presentation::LogSink => {
                log::error!(
                    "Permission denied: {} on '{}'",
                    error.operation(),
                    error.path()
                );
            }
        }
    }
}

pub struct PermissionErrorListener {
    hub: EventHub,
    presentation: Presentation,
    subscription: Option<SubscriptionId>,
}

impl PermissionErrorListener {
    pub fn new(hub: EventHub, presentation: Presentation) -> Self {
        Self {
            hub,
            presentation,
            subscription: None,
        }
    }

    pub fn from_config(hub: EventHub, config: &AppConfig) -> Self {
        Self::new(hub, Presentation::for_config(config))
    }

    /// Start receiving permission errors. Mounting twice keeps one subscription.
    pub fn mount(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        let presentation = self.presentation.clone();
        let id = self
            .hub
            .on_permission_error(move |error| presentation.present(error));
        log::debug!("Permission error listener mounted ({})", id);
        self.subscription = Some(id);
    }

    /// Stop receiving permission errors
    pub fn unmount(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.hub.unsubscribe(EventName::PermissionError, id);
            log::debug!("Permission error listener unmounted ({})", id);
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// The overlay errors are collected in, when running in development
    pub fn overlay(&self) -> Option<&ErrorOverlay> {
        match &self.presentation {
            Presentation::Overlay(overlay) => Some(overlay),
            Presentation::LogSink => None,
        }
    }
}

impl Drop for PermissionErrorListener {
    fn drop(&mut self) {
        self.unmount();
    }
}
