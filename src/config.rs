//! Navigation tuning constants with TOML persistence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::environment::OcclusionQuery;
use crate::types::{
    NavError, NavResult, DEDUCTION_LIMIT, SAFE_NEIGHBOUR_DISTANCE, SECTOR_CANDIDATE_LIMIT,
};

/// How the planner derives navigable edges from the maintained neighbour lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeSelection {
    /// Prune each node's neighbours to one per compass sector within distance bounds.
    #[default]
    SectorPruned,
    /// Use the neighbour lists as they are.
    Maintained,
}

/// Complete navigation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Where the relation graph is persisted.
    pub graph_path: PathBuf,

    /// Maximum offset entries averaged during position deduction.
    pub deduction_limit: usize,

    /// Maximum neighbour candidates examined per node during edge pruning.
    pub sector_candidate_limit: usize,

    /// Candidates further than this must also pass the ratio test.
    pub safe_neighbour_distance: f32,

    /// Candidates further than this multiple of the nearest pick are dropped.
    pub sector_distance_ratio: f32,

    /// Vertical offset of the extra visibility probes above and below a landmark.
    pub probe_margin: f32,

    /// Reach of the floor/ceiling detection probes.
    pub vertical_probe_distance: f32,

    /// Candidate radius for neighbour inference. Defaults to the environment's.
    pub observation_radius: Option<f32>,

    /// Delay before neighbour inference (ms). Defaults to the environment update interval.
    pub settle_delay_ms: Option<u64>,

    /// Edge derivation mode used by the planner.
    pub edge_selection: EdgeSelection,

    /// Clear the anchor store and graph when the store is attached.
    pub clear_on_start: bool,

    /// Window length of the tracking jitter estimator.
    pub deviation_window: usize,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            graph_path: PathBuf::from("anchorGraphInfo.json"),
            deduction_limit: DEDUCTION_LIMIT,
            sector_candidate_limit: SECTOR_CANDIDATE_LIMIT,
            safe_neighbour_distance: SAFE_NEIGHBOUR_DISTANCE,
            sector_distance_ratio: 3.0,
            probe_margin: 0.5,
            vertical_probe_distance: 100.0,
            observation_radius: None,
            settle_delay_ms: None,
            edge_selection: EdgeSelection::default(),
            clear_on_start: false,
            deviation_window: 100,
        }
    }
}

impl NavConfig {
    /// Defaults with the graph persisted at `path`.
    pub fn with_graph_path(path: impl Into<PathBuf>) -> Self {
        Self {
            graph_path: path.into(),
            ..Self::default()
        }
    }

    /// Load from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> NavResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| NavError::Config(format!("Failed to parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> NavResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| NavError::Config(format!("Failed to encode config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the algorithms cannot work with.
    pub fn validate(&self) -> NavResult<()> {
        if self.deduction_limit == 0 {
            return Err(NavError::Config("deduction_limit must be positive".into()));
        }
        if self.sector_candidate_limit == 0 {
            return Err(NavError::Config(
                "sector_candidate_limit must be positive".into(),
            ));
        }
        if self.safe_neighbour_distance < 0.0 || self.sector_distance_ratio < 0.0 {
            return Err(NavError::Config(
                "neighbour distance bounds must not be negative".into(),
            ));
        }
        if self.probe_margin < 0.0 {
            return Err(NavError::Config("probe_margin must not be negative".into()));
        }
        Ok(())
    }

    /// Effective inference radius.
    pub fn observation_radius(&self, environment: &dyn OcclusionQuery) -> f32 {
        self.observation_radius
            .unwrap_or_else(|| environment.observation_radius())
    }

    /// Effective settling delay.
    pub fn settle_delay(&self, environment: &dyn OcclusionQuery) -> Duration {
        self.settle_delay_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| environment.update_interval())
    }
}
