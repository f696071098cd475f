use crate::application::feed_pipeline::PipelineOptions;
use crate::domain::widget::WidgetInstanceConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub feeds: FeedSettings,
    /// Empty means the built-in default widget set
    #[serde(default)]
    pub widgets: Vec<WidgetInstanceConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedSettings {
    /// Simulated latency of demo providers
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    /// 0 disables the timeout
    #[serde(default)]
    pub fetch_timeout_secs: u64,
    #[serde(default)]
    pub serialize_fetches: bool,
    /// Serve demo data for feeds without a configured source
    #[serde(default = "default_demo_fallback")]
    pub demo_fallback: bool,
    /// Feed name -> URL template (`${feed}` and `${date}` are substituted)
    #[serde(default)]
    pub sources: HashMap<String, String>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            fetch_timeout_secs: 0,
            serialize_fetches: false,
            demo_fallback: default_demo_fallback(),
            sources: HashMap::new(),
        }
    }
}

fn default_latency_ms() -> u64 {
    300
}

fn default_demo_fallback() -> bool {
    true
}

impl FeedSettings {
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            serialize_fetches: self.serialize_fetches,
            fetch_timeout: (self.fetch_timeout_secs > 0)
                .then(|| Duration::from_secs(self.fetch_timeout_secs)),
        }
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

/// Load `config/dashboard.*` (optional) overlaid with `DASHBOARD__*` env vars
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from("config/dashboard")
}

pub fn load_app_config_from(path: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
