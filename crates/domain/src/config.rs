use std::{env, time::Duration};

/// Runtime settings read from the environment.
#[derive(Clone, Debug)]
pub struct Settings {
    pub bind_addr: String,
    /// Simulated latency of the mock estimator
    pub estimate_delay: Duration,
    /// Remote estimates endpoint; mock data only when unset
    pub estimates_url: Option<String>,
    pub estimates_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            estimate_delay: Duration::from_millis(1500),
            estimates_url: None,
            estimates_timeout: Duration::from_millis(5000),
        }
    }
}

fn millis(name: &str, default: Duration) -> Duration {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: env::var("API_BIND_ADDR").unwrap_or(defaults.bind_addr),
            estimate_delay: millis("ESTIMATE_DELAY_MS", defaults.estimate_delay),
            estimates_url: env::var("DELIVERY_ESTIMATES_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            estimates_timeout: millis("DELIVERY_ESTIMATES_TIMEOUT_MS", defaults.estimates_timeout),
        }
    }
}
