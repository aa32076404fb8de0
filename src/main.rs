use anyhow::Context as _;
use pulsecheck::{
    AuthIdentity, DEFAULT_LOG_LEVEL, EventHub, EventName, GuardedStore, MemoryBackend,
    PermissionErrorListener, StoreOperation,
};
use serde_json::json;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let logging = pulsecheck::init_logging(DEFAULT_LOG_LEVEL)?;
    let config = pulsecheck::config::load_config(parse_config_path())
        .context("failed to load configuration")?;
    logging.set_default_level(&config.log_level)?;
    log::info!("Starting PulseCheck ({})", config.environment);

    let hub = EventHub::new();

    let mut listener = PermissionErrorListener::from_config(hub.clone(), &config);
    listener.mount();

    let backend = MemoryBackend::new()
        .allow("surveys/", &[StoreOperation::Get, StoreOperation::List])
        .allow("responses/", &[StoreOperation::Create, StoreOperation::Write])
        .seed("surveys/q3-pulse", json!({ "title": "Q3 pulse check", "questions": 12 }));
    let store = GuardedStore::new(backend, hub.clone()).with_auth(AuthIdentity {
        uid: "employee-42".to_string(),
        email: Some("employee42@example.com".to_string()),
    });

    if let Some(survey) = store.get("surveys/q3-pulse")? {
        log::info!("Loaded survey: {}", survey);
    }
    store.set_non_blocking(
        "responses/q3-pulse-employee-42",
        json!({ "survey": "q3-pulse", "score": 4 }),
        false,
    );

    // Employees may not edit survey definitions; this is reported on the hub.
    store.update_non_blocking("surveys/q3-pulse", json!({ "questions": 13 }));

    if let Some(overlay) = listener.overlay() {
        for entry in overlay.entries() {
            println!("[{}] {}", entry.received_at.to_rfc3339(), entry.error);
        }
    }

    listener.unmount();

    let stats = hub.stats(EventName::PermissionError);
    log::info!(
        "permission-error: {} published, {} delivered, {} handler failures",
        stats.events_published,
        stats.events_delivered,
        stats.handler_failures
    );
    Ok(())
}

fn parse_config_path() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);

    // Check if user specified a custom config path via --config flag
    while let Some(flag) = args.next() {
        if flag == "--config" {
            if let Some(value) = args.next() {
                return Some(PathBuf::from(value));
            }
        }
    }

    None
}
