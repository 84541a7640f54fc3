//! Configuration management for grafsync
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. optional settings file (`--config`)
//! 3. `GRAFSYNC_*` environment variables (`__` separates nested keys)
//! 4. command line flags (each with its own env fallback, e.g. `GRAFANA_URL`)

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, bail};
use clap::Parser;
use config::{Config, Environment, File};
use grafsync_client::{
    GrafanaClientConfig, ReadinessPolicy, RetryPolicy,
    constants::{ENV_BEARER_TOKEN, ENV_PASSWORD, ENV_USER},
};
use grafsync_core::{AnnotationKeys, BootstrapSettings};
use serde::Deserialize;

pub const DEFAULT_FOLDERS: &str = "tos,tdh,tdc";
pub const DEFAULT_HOME_PAGE: &str = "ji-qun-zong-lan";

/// Command line arguments
#[derive(Debug, Default, Parser)]
#[command(name = "grafsync", version, about = "Sync annotated ConfigMaps into Grafana")]
pub struct Cli {
    /// The url to issue requests to update dashboards to
    #[arg(long = "grafana-url", env = "GRAFANA_URL")]
    pub grafana_url: Option<String>,
    /// Comma-separated folder names to create at start-up
    #[arg(long = "grafana-folder", env = "GRAFANA_FOLDER")]
    pub grafana_folder: Option<String>,
    /// Slug of the dashboard to set as the org home page
    #[arg(long = "grafana-homepage", env = "GRAFANA_HOMEPAGE")]
    pub grafana_homepage: Option<String>,
    /// Use kubeconfig instead of the in-cluster service account
    #[arg(long = "run-outside-cluster")]
    pub run_outside_cluster: bool,
    /// Namespace to watch ConfigMaps in
    #[arg(long = "namespace", env = "POD_NAMESPACE")]
    pub namespace: Option<String>,
    /// Optional settings file (yaml, toml or json)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

/// Effective settings after all sources are merged
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub grafana_url: String,
    #[serde(default = "default_folders")]
    pub grafana_folder: String,
    #[serde(default = "default_home_page")]
    pub grafana_homepage: String,
    #[serde(default)]
    pub run_outside_cluster: bool,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_readiness_interval_secs")]
    pub readiness_interval_secs: u64,
    #[serde(default = "default_readiness_timeout_secs")]
    pub readiness_timeout_secs: u64,
    #[serde(default = "default_home_page_attempts")]
    pub home_page_attempts: u32,
    #[serde(default = "default_home_page_delay_secs")]
    pub home_page_delay_secs: u64,
    #[serde(default)]
    pub annotations: AnnotationKeys,
}

fn default_folders() -> String {
    DEFAULT_FOLDERS.to_string()
}

fn default_home_page() -> String {
    DEFAULT_HOME_PAGE.to_string()
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

fn default_request_timeout_ms() -> u64 {
    30000
}

fn default_readiness_interval_secs() -> u64 {
    3
}

fn default_readiness_timeout_secs() -> u64 {
    600
}

fn default_home_page_attempts() -> u32 {
    10
}

fn default_home_page_delay_secs() -> u64 {
    6
}

impl Settings {
    /// Parse the command line and merge every source
    pub fn load() -> anyhow::Result<Self> {
        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = &cli.config {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("GRAFSYNC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(v) = cli.grafana_url {
            builder = builder.set_override("grafana_url", v)?;
        }
        if let Some(v) = cli.grafana_folder {
            builder = builder.set_override("grafana_folder", v)?;
        }
        if let Some(v) = cli.grafana_homepage {
            builder = builder.set_override("grafana_homepage", v)?;
        }
        if cli.run_outside_cluster {
            builder = builder.set_override("run_outside_cluster", true)?;
        }
        if let Some(v) = cli.namespace {
            builder = builder.set_override("namespace", v)?;
        }

        let settings: Settings = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.grafana_url.trim().is_empty() {
            bail!("Missing grafana-url");
        }
        GrafanaClientConfig::new(&self.grafana_url)
            .with_context(|| format!("Grafana URL could not be parsed: {}", self.grafana_url))?;
        Ok(())
    }

    /// Client configuration with credentials from the process environment
    pub fn client_config(&self) -> anyhow::Result<GrafanaClientConfig> {
        self.client_config_with(|key| std::env::var(key).ok())
    }

    /// Client configuration with credentials looked up through `env`
    pub fn client_config_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<GrafanaClientConfig> {
        let non_empty = |key: &str| env(key).filter(|v| !v.is_empty());

        let mut config = GrafanaClientConfig::new(&self.grafana_url)
            .with_context(|| format!("Grafana URL could not be parsed: {}", self.grafana_url))?
            .with_timeouts(
                Duration::from_millis(self.connect_timeout_ms),
                Duration::from_millis(self.request_timeout_ms),
            );

        if let Some(user) = non_empty(ENV_USER) {
            let password = non_empty(ENV_PASSWORD);
            config = config.with_basic_auth(&user, password.as_deref());
        }
        if let Some(token) = non_empty(ENV_BEARER_TOKEN) {
            config = config.with_bearer_token(&token);
        }
        Ok(config)
    }

    pub fn bootstrap(&self) -> BootstrapSettings {
        let home_page = self.grafana_homepage.trim();
        BootstrapSettings {
            home_page: (!home_page.is_empty()).then(|| home_page.to_string()),
            readiness: ReadinessPolicy {
                interval: Duration::from_secs(self.readiness_interval_secs),
                timeout: Duration::from_secs(self.readiness_timeout_secs),
            },
            home_page_retry: RetryPolicy {
                attempts: self.home_page_attempts,
                delay: Duration::from_secs(self.home_page_delay_secs),
            },
        }
    }
}
