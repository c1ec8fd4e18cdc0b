use crate::configuration::{ConfigError, LookerConfig};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

// Tool calls against Looker can run long queries.
const TOOLBOX_TIMEOUT_SECS: u64 = 300;

/// Whether the Looker credentials were present at startup. Computed once and
/// shared with every handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readiness {
    pub missing: Vec<String>,
}

impl Readiness {
    pub fn of(config: &LookerConfig) -> Self {
        match config.validate() {
            Err(ConfigError::MissingFields(missing)) => Readiness { missing },
            _ => Readiness {
                missing: Vec::new(),
            },
        }
    }

    pub fn is_configured(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Upstream toolbox that serves the MCP endpoint.
#[derive(Clone)]
pub struct Toolbox {
    pub url: String,
    pub http_client: reqwest::Client,
}

impl Toolbox {
    pub fn new(url: String) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TOOLBOX_TIMEOUT_SECS))
            .build()
            .context("failed to build toolbox HTTP client")?;
        Ok(Self { url, http_client })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub looker: LookerConfig,
    pub readiness: Readiness,
    pub toolbox: Option<Toolbox>,
}

impl AppState {
    pub fn new(
        looker: LookerConfig,
        toolbox_url: Option<String>,
    ) -> anyhow::Result<Arc<AppState>> {
        let readiness = Readiness::of(&looker);
        let toolbox = toolbox_url.map(Toolbox::new).transpose()?;
        Ok(Arc::new(Self {
            looker,
            readiness,
            toolbox,
        }))
    }
}
