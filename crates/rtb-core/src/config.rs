use std::{env, fs, path::Path, time::Duration};

use crate::gateway::throttled::ThrottleConfig;

/// Typed runtime configuration, loaded from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    /// Delete a destination's subscriptions when it turns out to be
    /// unreachable (blocked / kicked / chat not found).
    pub delete_on_failed_delivery: bool,
    /// Upper bound on concurrently in-flight subscriber deliveries.
    pub max_concurrent_deliveries: usize,
    /// Per-send deadline; an elapsed timeout counts as an unclassified failure.
    pub send_timeout: Duration,
    /// Minimum spacing between any two outbound sends.
    pub global_min_interval: Duration,
    /// Minimum spacing between sends to the same chat.
    pub per_chat_min_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delete_on_failed_delivery: true,
            max_concurrent_deliveries: 16,
            send_timeout: Duration::from_secs(10),
            global_min_interval: Duration::from_millis(40),
            per_chat_min_interval: Duration::from_millis(1050),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        load_dotenv_if_present(Path::new(".env"));

        let defaults = Self::default();
        Self {
            delete_on_failed_delivery: env_bool("DELETE_ON_FAILED_DELIVERY")
                .unwrap_or(defaults.delete_on_failed_delivery),
            max_concurrent_deliveries: env_usize("MAX_CONCURRENT_DELIVERIES")
                .unwrap_or(defaults.max_concurrent_deliveries)
                .max(1),
            send_timeout: env_u64("SEND_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.send_timeout),
            global_min_interval: env_u64("GLOBAL_MIN_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.global_min_interval),
            per_chat_min_interval: env_u64("PER_CHAT_MIN_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.per_chat_min_interval),
        }
    }

    pub fn throttle(&self) -> ThrottleConfig {
        ThrottleConfig {
            global_min_interval: self.global_min_interval,
            per_chat_min_interval: self.per_chat_min_interval,
        }
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}
