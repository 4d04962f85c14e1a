use std::ffi::OsString;

use clap::Parser;
use qdl_core::QdlError;

mod agent;
mod check;
mod cli_args;
mod error_map;
mod line_tui;
mod models;
mod session_ops;
mod source_loader;
mod state_store;
mod tui;
mod tui_actions;
mod tui_render;
mod tui_state;
mod turn_emitter;

pub(crate) use cli_args::{
    AgentArgs, AgentCommand, CheckArgs, ChooseArgs, Cli, CompileArgs, Mode, StartArgs, TuiArgs,
};
pub(crate) use error_map::{
    emit_error, json_string, map_cli_source_path, map_cli_source_read, map_cli_source_scan,
    map_cli_state_encode, map_cli_state_invalid, map_cli_state_read, map_cli_state_write,
    map_tui_io,
};
pub(crate) use line_tui::run_tui_line_mode;
pub(crate) use models::{
    LoadedDialogue, PlayerStateV1, TuiCommandAction, TuiCommandContext, TurnEvent, TurnResult,
    PLAYER_STATE_SCHEMA,
};
pub(crate) use session_ops::{
    compile_options, emit_session, load_session_from_state, load_session_from_state_for_dialogue,
    open_session_for_dialogue, save_session_state,
};
pub(crate) use source_loader::{
    collect_dialogue_files, load_dialogue, read_dialogue, resolve_source_path,
};
pub(crate) use state_store::{load_player_state, save_player_state};
pub(crate) use turn_emitter::{describe_turn, emit_turn};

pub(crate) const DEFAULT_STATE_FILE: &str = ".qdl/save.json";

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, QdlError> {
    match cli.command {
        Mode::Agent(args) => agent::run_agent(args),
        Mode::Tui(args) => run_tui(args),
        Mode::Check(args) => check::run_check(args),
    }
}

fn run_tui(args: TuiArgs) -> Result<i32, QdlError> {
    let state_file = args
        .state_file
        .unwrap_or_else(|| DEFAULT_STATE_FILE.to_string());
    let dialogue = load_dialogue(&args.source)?;
    let options = compile_options(&args.compile);
    let mut session = open_session_for_dialogue(&dialogue, &options)?;
    let context = TuiCommandContext {
        state_file: &state_file,
        dialogue: &dialogue,
        options: &options,
    };

    tui::run_tui_mode(&context, &mut session)
}

#[cfg(test)]
mod cli_test_support;
