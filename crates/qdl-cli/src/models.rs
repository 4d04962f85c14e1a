use std::path::PathBuf;

use qdl_core::ExternalCommand;
use serde::{Deserialize, Serialize};

pub(crate) const PLAYER_STATE_SCHEMA: &str = "qdl-player-state.v1";

#[derive(Debug, Clone)]
pub(crate) struct LoadedDialogue {
    pub(crate) path: PathBuf,
    pub(crate) source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayerStateV1 {
    pub(crate) schema_version: String,
    pub(crate) source_path: String,
    #[serde(default)]
    pub(crate) host_commands: Vec<String>,
    #[serde(default)]
    pub(crate) strict_references: bool,
    pub(crate) active_header: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TurnEvent {
    Branch,
    End,
}

/// What the agent protocol prints after a turn.
#[derive(Debug, Clone)]
pub(crate) struct TurnResult {
    pub(crate) event: TurnEvent,
    pub(crate) title: String,
    pub(crate) header: Option<String>,
    pub(crate) message: Option<String>,
    pub(crate) choices: Vec<String>,
    pub(crate) external: Option<ExternalCommand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TuiCommandAction {
    Help,
    Save,
    Load,
    Restart,
    Quit,
}

pub(crate) struct TuiCommandContext<'a> {
    pub(crate) state_file: &'a str,
    pub(crate) dialogue: &'a LoadedDialogue,
    pub(crate) options: &'a qdl_api::CompileOptions,
}
