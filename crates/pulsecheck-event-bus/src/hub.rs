use crate::core::{EmitReport, EventBusContainer, EventBusStats, SubscriptionId};
use pulsecheck_types::{AppEvent, EventName, PermissionError, StoreOperation, path_is_under};

/// Application-wide event hub.
///
/// Holds one typed bus per [`EventName`]. Construct it once at startup and
/// hand clones to producers and consumers; clones share the registries.
#[derive(Clone)]
pub struct EventHub {
    permission_errors: EventBusContainer<PermissionError>,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            permission_errors: EventBusContainer::new(EventName::PermissionError.as_str()),
        }
    }

    /// Publish any event to the bus registered for its name
    pub fn emit(&self, event: AppEvent) -> EmitReport {
        match event {
            AppEvent::PermissionError(error) => self.permission_errors.publish(error),
        }
    }

    pub fn unsubscribe(&self, name: EventName, id: SubscriptionId) -> bool {
        match name {
            EventName::PermissionError => self.permission_errors.unsubscribe(id),
        }
    }

    pub fn stats(&self, name: EventName) -> EventBusStats {
        match name {
            EventName::PermissionError => self.permission_errors.stats(),
        }
    }

    pub fn subscriber_count(&self, name: EventName) -> usize {
        match name {
            EventName::PermissionError => self.permission_errors.subscriber_count(),
        }
    }

    pub fn clear(&self, name: EventName) {
        match name {
            EventName::PermissionError => self.permission_errors.clear(),
        }
    }

    pub fn subscribe_permission_errors<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&PermissionError) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.permission_errors.subscribe(callback)
    }

    /// Infallible variant of [`Self::subscribe_permission_errors`]
    pub fn on_permission_error<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&PermissionError) + Send + Sync + 'static,
    {
        self.permission_errors.subscribe(move |error| {
            callback(error);
            Ok(())
        })
    }

    pub fn subscribe_permission_errors_for_operation<F>(
        &self,
        operation: StoreOperation,
        callback: F,
    ) -> SubscriptionId
    where
        F: Fn(&PermissionError) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.permission_errors
            .subscribe_with_filter(callback, move |error| error.operation() == operation)
    }

    /// Only errors at or below `prefix`, e.g. `"surveys/"`; matches whole path segments
    pub fn subscribe_permission_errors_under<F>(&self, prefix: String, callback: F) -> SubscriptionId
    where
        F: Fn(&PermissionError) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.permission_errors
            .subscribe_with_filter(callback, move |error| path_is_under(error.path(), &prefix))
    }

    pub fn subscribe_permission_error_once<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnOnce(&PermissionError) + Send + 'static,
    {
        self.permission_errors.subscribe_once(callback)
    }

    pub fn emit_permission_error(&self, error: PermissionError) -> EmitReport {
        self.emit(AppEvent::PermissionError(error))
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
