use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "certfolio.toml";
pub const DEFAULT_SOURCE_PATH: &str = "certificates/certificates-config.json";

/// Top-level layout of certfolio.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gallery: GallerySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GallerySettings {
    /// Locator of the certificates config document, relative to the site.
    pub source_path: String,
    /// When set, the document is fetched over HTTP relative to this URL.
    pub base_url: Option<String>,
    /// Directory the file fetcher resolves `source_path` against.
    pub site_root: String,
    /// No timeout unless configured.
    pub timeout_secs: Option<u64>,
    pub reveal: RevealSettings,
}

impl Default for GallerySettings {
    fn default() -> Self {
        GallerySettings {
            source_path: DEFAULT_SOURCE_PATH.to_string(),
            base_url: None,
            site_root: "website".to_string(),
            timeout_secs: None,
            reveal: RevealSettings::default(),
        }
    }
}

impl GallerySettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }
}

/// Timing of the staggered card reveal after a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealSettings {
    pub initial_delay_ms: u64,
    pub stagger_ms: u64,
}

impl Default for RevealSettings {
    fn default() -> Self {
        RevealSettings {
            initial_delay_ms: 200,
            stagger_ms: 150,
        }
    }
}

impl RevealSettings {
    /// Reveal every card as soon as it is painted.
    pub fn immediate() -> Self {
        RevealSettings {
            initial_delay_ms: 0,
            stagger_ms: 0,
        }
    }

    /// Offset of card `index` from the moment the markup was written.
    pub fn delay_for(&self, index: usize) -> Duration {
        let stagger = self.stagger_ms.saturating_mul(index as u64);
        Duration::from_millis(self.initial_delay_ms.saturating_add(stagger))
    }
}

impl Settings {
    pub fn parse(input: &str) -> Result<Self, String> {
        toml::from_str(input).map_err(|e| format!("Invalid settings: {}", e))
    }

    /// Load settings from a TOML file. A missing file yields the defaults;
    /// an unreadable or unparsable one is an error.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            log::info!("{} not found, using default settings", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::parse(&raw)
    }
}
