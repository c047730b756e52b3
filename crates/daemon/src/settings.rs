use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

/// Defaults for `formsink serve`, read from a TOML file.
///
/// ```toml
/// listen = "0.0.0.0:1234"
/// maildir = "/var/mail/formsink"
/// redirect = "https://example.com/thanks"
/// documents = ["site/contact.html"]
/// ```
///
/// Every key is optional; command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub listen: Option<SocketAddr>,
    pub maildir: Option<PathBuf>,
    pub redirect: Option<Url>,
    pub hostname: Option<String>,
    #[serde(default)]
    pub documents: Vec<PathBuf>,
    pub max_memory: Option<usize>,
    pub max_body: Option<usize>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Settings {
    /// Load settings from `path`, or use the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = toml::from_str(&raw).map_err(|source| SettingsError::Toml {
            path: path.to_path_buf(),
            source,
        })?;

        // Relative document paths are relative to the settings file
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(Self::relative_to(settings, base))
    }

    fn relative_to(mut settings: Self, base: &Path) -> Self {
        settings.documents = settings
            .documents
            .into_iter()
            .map(|doc| if doc.is_relative() { base.join(doc) } else { doc })
            .collect();
        settings
    }
}
