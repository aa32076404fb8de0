pub mod core;
pub mod hub;

pub use crate::core::{
    EmitReport, EventBus, EventBusContainer, EventBusStats, FailureCause, HandlerFailure,
    SubscriptionId,
};
pub use hub::EventHub;

// Re-export types for convenience
pub use pulsecheck_types::{AppEvent, EventName, PermissionError, SecurityRuleContext, StoreOperation};
