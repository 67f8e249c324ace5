//! Soundboard configuration
//!
//! Configuration is read from YAML. Every field is optional; omitted fields
//! take the defaults below.
//!
//! ```yaml
//! sounds_dir: /srv/soundboard/sounds
//! extension: dca
//! command_prefix: "!"
//! settle_delay_ms: 250
//! queue_depth: 8
//! channel_capacity: 2
//! sounds:
//!   airhorn: airhorn
//!   moo: cow_moo
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::command::CommandRouter;
use crate::playback::PlaybackConfig;
use crate::sources::DirectorySource;
use crate::sources::directory::DEFAULT_EXTENSION;
use crate::transports::{ChannelConnector, ChannelListener};
use crate::{Result, SoundboardError};

/// Trigger words and container identifiers shipped with the soundboard.
pub const DEFAULT_SOUNDS: &[(&str, &str)] = &[
    ("airhorn", "airhorn"),
    ("truckstop", "truckstop"),
    ("birthdaysad", "birthday_sadhorn"),
    ("airhorn4", "airhorn_fourtap"),
    ("airhorntruck", "airhorn_truck"),
    ("airhornclown", "airhorn_clownfull"),
    ("airhornfart", "airhorn_highfartlong"),
    ("birthday", "birthday_horn3"),
    ("moo", "cow_moo"),
    ("cows", "cow_herd"),
    ("crazy", "ethan_areyou_classic"),
    ("soda", "ethan_sodiepop"),
    ("ethanclassic", "ethan_classic"),
    ("ethancut", "ethan_cuts"),
    ("jc", "jc_full"),
    ("anotherone", "another_one_classic"),
    ("realfast", "realfast"),
    ("spaghetti", "spaghetti"),
    ("ohmygoodness", "ohmygoodness"),
    ("tellusthetruth", "tellusthetruth"),
    ("american", "american"),
    ("assuming", "assuming"),
    ("bummer", "bummer"),
    ("crack", "crack"),
    ("ding", "ding"),
    ("erik", "erik"),
    ("fantasy", "fantasy"),
    ("jiras", "jiras"),
    ("lossofwords", "lossofwords"),
    ("niceguy", "niceguy"),
    ("nonono", "nonono"),
    ("ooo", "ooo"),
    ("retrograde", "retrograde"),
    ("sweetjesus", "sweetjesus"),
    ("talktome", "talktome"),
    ("whileitlasted", "whileitlasted"),
    ("butthole", "butthole"),
];

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SoundboardConfig {
    /// Directory holding `<identifier>.<extension>` containers.
    pub sounds_dir: PathBuf,
    pub extension: String,
    pub command_prefix: String,
    /// Pause before and after playback, in milliseconds.
    pub settle_delay_ms: u64,
    /// Requests that may wait behind the one currently playing.
    pub queue_depth: usize,
    /// Frames buffered by the loopback transport before `send` waits.
    pub channel_capacity: usize,
    /// Trigger word to container identifier.
    pub sounds: BTreeMap<String, String>,
}

impl Default for SoundboardConfig {
    fn default() -> Self {
        Self {
            sounds_dir: PathBuf::from("."),
            extension: DEFAULT_EXTENSION.to_string(),
            command_prefix: "!".to_string(),
            settle_delay_ms: 250,
            queue_depth: 8,
            channel_capacity: 2,
            sounds: DEFAULT_SOUNDS.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }
}

impl SoundboardConfig {
    /// Load and validate configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| SoundboardError::config(path, format!("failed to read file: {e}")))?;
        let config = Self::parse(&yaml, path)?;
        debug!("Loaded configuration from {} ({} sounds)", path.display(), config.sounds.len());
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::parse(yaml, Path::new("<memory>"))
    }

    fn parse(yaml: &str, path: &Path) -> Result<Self> {
        // An empty document means "all defaults".
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(yaml).map_err(|e| SoundboardError::config(path, e.to_string()))?
        };
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.command_prefix.is_empty() {
            return Err(SoundboardError::config(path, "command_prefix must not be empty"));
        }
        if self.queue_depth == 0 {
            return Err(SoundboardError::config(path, "queue_depth must be at least 1"));
        }
        if self.channel_capacity == 0 {
            return Err(SoundboardError::config(path, "channel_capacity must be at least 1"));
        }
        if let Some((trigger, _)) = self.sounds.iter().find(|(_, id)| id.trim().is_empty()) {
            return Err(SoundboardError::config(
                path,
                format!("sound '{trigger}' has an empty identifier"),
            ));
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig { settle_delay: self.settle_delay() }
    }

    pub fn router(&self) -> CommandRouter {
        CommandRouter::new(self.command_prefix.clone(), &self.sounds)
    }

    pub fn directory_source(&self) -> DirectorySource {
        DirectorySource::with_extension(&self.sounds_dir, self.extension.clone())
    }

    pub fn loopback_connector(&self) -> (ChannelConnector, ChannelListener) {
        ChannelConnector::new(self.channel_capacity)
    }
}
