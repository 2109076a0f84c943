//! Board configuration
//!
//! Sources in precedence order (later wins):
//! 1. Built-in defaults
//! 2. `corkboard.toml` / `corkboard.yaml` in the board root
//! 3. `CORKBOARD_*` environment variables

use crate::error::{KanbanError, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Config file names looked up in the board root
pub const CONFIG_FILES: [&str; 2] = ["corkboard.toml", "corkboard.yaml"];

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CORKBOARD_";

/// Settings for one board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanbanConfig {
    /// Titles of the columns created by `init board`
    pub default_columns: Vec<String>,
    /// Append mutating operations to the activity log
    pub activity_log: bool,
    /// Language for client-side formatting
    pub lang: String,
}

impl Default for KanbanConfig {
    fn default() -> Self {
        Self {
            default_columns: vec!["To do".into(), "In progress".into(), "Done".into()],
            activity_log: true,
            lang: "en".into(),
        }
    }
}

impl KanbanConfig {
    /// Load configuration for the board rooted at `root`
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let figment = Self::figment(root.as_ref());
        figment.extract().map_err(|e| KanbanError::Config {
            message: e.to_string(),
        })
    }

    fn figment(root: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        for name in CONFIG_FILES {
            let path = root.join(name);
            if path.exists() {
                debug!(path = %path.display(), "loading board config file");
                figment = if name.ends_with(".toml") {
                    figment.merge(Toml::file(path))
                } else {
                    figment.merge(Yaml::file(path))
                };
            }
        }

        figment.merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into()))
    }
}
