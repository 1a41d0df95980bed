//! Who plays each side, how long engines may think, and where the engine
//! lives. Stored as TOML so a play setup survives restarts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use chess_rules::Side;
use uci_client::EngineEndpoint;

/// Move source for one side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Controller {
    Human,
    Engine,
    Random,
}

impl std::fmt::Display for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Controller::Human => "human",
            Controller::Engine => "engine",
            Controller::Random => "random",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Controller {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(Controller::Human),
            "engine" => Ok(Controller::Engine),
            "random" => Ok(Controller::Random),
            other => Err(format!(
                "unknown controller {:?}, expected human, engine or random",
                other
            )),
        }
    }
}

/// Settings for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideSettings {
    pub controller: Controller,
    /// Whole seconds the machine may think per move.
    pub think_time_secs: u64,
}

impl Default for SideSettings {
    fn default() -> Self {
        Self {
            controller: Controller::Human,
            think_time_secs: 1,
        }
    }
}

impl SideSettings {
    pub fn think_time(&self) -> Duration {
        Duration::from_secs(self.think_time_secs)
    }
}

/// Where engine-controlled sides find their engine. A local command is
/// preferred; the address is the fallback for machines without one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub command: Option<PathBuf>,
    pub address: Option<String>,
}

impl EngineSettings {
    pub fn endpoint(&self) -> EngineEndpoint {
        EngineEndpoint {
            command: self.command.clone(),
            address: self.address.clone(),
        }
    }
}

/// Complete play configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaySettings {
    pub white: SideSettings,
    pub black: SideSettings,
    pub engine: EngineSettings,
}

impl Default for PlaySettings {
    fn default() -> Self {
        Self {
            white: SideSettings::default(),
            black: SideSettings {
                controller: Controller::Engine,
                think_time_secs: 1,
            },
            engine: EngineSettings::default(),
        }
    }
}

impl PlaySettings {
    pub fn side(&self, side: Side) -> &SideSettings {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideSettings {
        match side {
            Side::White => &mut self.white,
            Side::Black => &mut self.black,
        }
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read: {}", e))?;
        let settings: PlaySettings =
            toml::from_str(&contents).map_err(|e| format!("Failed to parse: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let text = toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize: {}", e))?;
        std::fs::write(path, text).map_err(|e| format!("Failed to write: {}", e))
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, side) in [("white", &self.white), ("black", &self.black)] {
            if side.think_time_secs == 0 {
                return Err(format!("{}: think_time_secs must be at least 1", name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod settings_tests;
