use std::env;

use log::*;
use vintrade_common::helpers::parse_boolean_flag;
use vintrade_engine::ReconciliationOptions;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/vintrade.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Capacity of the notification channel. Notifications beyond this are dropped.
    pub event_buffer_size: usize,
    /// If true, every reconciliation notification is written to the log.
    pub log_notifications: bool,
    pub options: ReconciliationOptions,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            log_notifications: false,
            options: ReconciliationOptions::default(),
        }
    }
}

impl CliConfig {
    pub fn from_env_or_default() -> Self {
        let database_url = env::var("VT_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ VT_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.into()
        });
        let max_connections = env::var("VT_DB_MAX_CONNECTIONS")
            .map(|s| parse_max_connections(&s))
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let event_buffer_size = env::var("VT_EVENT_BUFFER_SIZE")
            .map(|s| parse_event_buffer_size(&s))
            .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        let log_notifications = parse_boolean_flag(env::var("VT_LOG_NOTIFICATIONS").ok(), false);
        let options = ReconciliationOptions::from_env_or_default();
        Self { database_url, max_connections, event_buffer_size, log_notifications, options }
    }
}

fn parse_max_connections(s: &str) -> u32 {
    match s.trim().parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => {
            warn!(
                "🪛️ {s} is not a valid value for VT_DB_MAX_CONNECTIONS. Using the default, {DEFAULT_MAX_CONNECTIONS}, \
                 instead."
            );
            DEFAULT_MAX_CONNECTIONS
        },
    }
}

fn parse_event_buffer_size(s: &str) -> usize {
    s.trim().parse::<usize>().ok().filter(|n| *n > 0).unwrap_or_else(|| {
        warn!(
            "🪛️ {s} is not a valid value for VT_EVENT_BUFFER_SIZE. Using the default, {DEFAULT_EVENT_BUFFER_SIZE}, \
             instead."
        );
        DEFAULT_EVENT_BUFFER_SIZE
    })
}
