pub mod config;
pub mod config_manager;
pub mod events;

pub use config::{AppConfig, DEFAULT_LOG_LEVEL, DEFAULT_OVERLAY_MAX_ENTRIES, Environment, OverlayConfig};
pub use events::{
    AppEvent, AuthIdentity, EventName, PermissionError, SecurityRuleContext, StoreOperation,
    path_is_under,
};
