//! Feed configuration.
//!
//! Configuration is read from TOML. Every field is optional and falls back to
//! the defaults of the stock colour feed:
//!
//! ```toml
//! item_count = 201
//! prefetch_count = 2
//! prefetch_enabled = true
//! max_reusable_cells = 7
//! animation_duration_ms = 300
//! axis = "horizontal"
//! # seed = 42
//! ```

use std::path::Path;
use std::time::Duration;

use horizon_feed_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::error::{FeedError, Result};
use crate::layout::Axis;
use crate::prefetch::{DEFAULT_PREFETCH_COUNT, PrefetchStrategy};
use crate::reuse::DEFAULT_MAX_PER_TAG;

/// Settings for a [`FeedController`](crate::FeedController).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Number of colours generated per load or refresh.
    pub item_count: usize,
    /// Rows announced ahead of the viewport.
    pub prefetch_count: usize,
    /// Whether rows are announced ahead at all.
    pub prefetch_enabled: bool,
    /// Idle cells kept for reuse.
    pub max_reusable_cells: usize,
    /// Duration consumers should use for animated applies.
    pub animation_duration_ms: u64,
    /// Paging direction.
    pub axis: Axis,
    /// Fixed random seed; `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            item_count: 201,
            prefetch_count: DEFAULT_PREFETCH_COUNT,
            prefetch_enabled: true,
            max_reusable_cells: DEFAULT_MAX_PER_TAG,
            animation_duration_ms: 300,
            axis: Axis::Horizontal,
            seed: None,
        }
    }
}

impl FeedConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| FeedError::io(path, err))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(target: targets::FEED, path = %path.display(), "loaded feed configuration");
        Ok(config)
    }

    /// Prefetch strategy described by this configuration.
    pub fn prefetch_strategy(&self) -> PrefetchStrategy {
        if self.prefetch_enabled {
            PrefetchStrategy::new(self.prefetch_count)
        } else {
            PrefetchStrategy::disabled()
        }
    }

    /// Animation duration for animated applies.
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }
}
