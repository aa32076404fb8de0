pub mod config;
pub mod error_listener;
pub mod store;

pub use error_listener::{ErrorOverlay, OverlayEntry, PermissionErrorListener, Presentation};
pub use store::{AccessRule, DocumentBackend, GuardedStore, MemoryBackend, StoreError, StoreResult};

pub use pulsecheck_event_bus::{EmitReport, EventHub, HandlerFailure, SubscriptionId};
pub use pulsecheck_types::{
    AppConfig, AppEvent, AuthIdentity, DEFAULT_LOG_LEVEL, Environment, EventName,
    PermissionError, SecurityRuleContext, StoreOperation,
};

use tracing_subscriber::{
    EnvFilter, Registry, layer::SubscriberExt as _, reload, util::SubscriberInitExt as _,
};

/// Adjusts the installed filter once the config file has been read.
pub struct LoggingHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    env_override: bool,
}

impl LoggingHandle {
    /// Switch to `level` unless `RUST_LOG` was set at startup.
    pub fn set_default_level(&self, level: &str) -> anyhow::Result<()> {
        if self.env_override {
            return Ok(());
        }
        let filter = EnvFilter::try_new(level)?;
        self.filter.reload(filter)?;
        log::debug!("Log level set to {}", level);
        Ok(())
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_level`. Records emitted through the `log`
/// macros are forwarded to the same subscriber.
pub fn init_logging(default_level: &str) -> anyhow::Result<LoggingHandle> {
    let (filter, env_override) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::try_new(default_level)?, false),
    };
    let (filter_layer, filter) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;
    Ok(LoggingHandle {
        filter,
        env_override,
    })
}
