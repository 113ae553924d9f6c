use anyhow::{Context, Result};
use patchcraft_core::{Change, HandlerId, HandlerState, Patch, DEFAULT_NAMESPACE};
use patchcraft_dispatch::{HandlerKind, UpdateDispatcher};
use serde::{Deserialize, Serialize};
use std::{fs, io::ErrorKind, path::Path};
use tracing::warn;

pub const DEFAULT_SCENARIO_PATH: &str = "config/scenario.toml";

/// A dispatcher setup plus how long to run it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Number of ticks to run.
    pub ticks: u64,
    /// Namespace applied to handler ids written without one.
    pub namespace: String,
    pub handlers: Vec<HandlerConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HandlerConfig {
    pub id: String,
    pub kind: HandlerKind,
    #[serde(default)]
    pub patch_version: u64,
    #[serde(default)]
    pub patches: Vec<WorkItemConfig>,
    #[serde(default)]
    pub changes: Vec<WorkItemConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkItemConfig {
    pub id: String,
    pub payload: String,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            ticks: 3,
            namespace: DEFAULT_NAMESPACE.to_string(),
            handlers: vec![
                HandlerConfig::bare("server:spigot", HandlerKind::NoOp),
                HandlerConfig::bare("server:paper", HandlerKind::Incremental),
                HandlerConfig::bare("server:yatopia", HandlerKind::Unstable),
            ],
        }
    }
}

impl HandlerConfig {
    fn bare(id: &str, kind: HandlerKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            patch_version: 0,
            patches: Vec::new(),
            changes: Vec::new(),
        }
    }

    fn initial_state(&self) -> HandlerState {
        HandlerState::new(
            self.patch_version,
            self.patches
                .iter()
                .map(|p| Patch::new(p.id.clone(), p.payload.clone()))
                .collect(),
            self.changes
                .iter()
                .map(|c| Change::new(c.id.clone(), c.payload.clone()))
                .collect(),
        )
    }
}

impl ScenarioConfig {
    /// Load the scenario passed on the command line, or the default one.
    ///
    /// An explicit path must exist and parse. Only a missing default file falls
    /// back to the built-in scenario.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_strict(path),
            None => Self::load_or_default(Path::new(DEFAULT_SCENARIO_PATH)),
        }
    }

    fn load_or_default(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents)
                .with_context(|| format!("failed to parse scenario {}", path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!("Scenario not found at {}. Using defaults", path.display());
                Ok(ScenarioConfig::default())
            }
            Err(err) => {
                Err(err).with_context(|| format!("failed to read scenario {}", path.display()))
            }
        }
    }

    /// Load a scenario, returning read and parse errors to the caller.
    pub fn load_strict(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Build a dispatcher with every configured handler registered in file order.
    pub fn build_dispatcher(&self) -> Result<UpdateDispatcher> {
        let mut dispatcher = UpdateDispatcher::new();
        for handler in &self.handlers {
            let id = HandlerId::parse_with_default_namespace(&handler.id, &self.namespace)
                .with_context(|| format!("invalid handler id `{}`", handler.id))?;
            dispatcher.register_with_state(id, handler.kind, handler.initial_state())?;
        }
        Ok(dispatcher)
    }
}
