use std::path::Path;

use log::info;
use qdl_api::{open_session, resume_session, CompileOptions, ResumeSessionOptions};
use qdl_core::QdlError;
use qdl_runtime::DialogueSession;

use crate::{
    describe_turn, emit_turn, load_dialogue, load_player_state, save_player_state, CompileArgs,
    LoadedDialogue, PlayerStateV1, TurnEvent, TurnResult, PLAYER_STATE_SCHEMA,
};

pub(crate) fn compile_options(args: &CompileArgs) -> CompileOptions {
    CompileOptions {
        host_commands: args.host_commands.iter().cloned().collect(),
        strict_references: args.strict,
    }
}

fn options_from_state(state: &PlayerStateV1) -> CompileOptions {
    CompileOptions {
        host_commands: state.host_commands.iter().cloned().collect(),
        strict_references: state.strict_references,
    }
}

pub(crate) fn open_session_for_dialogue(
    dialogue: &LoadedDialogue,
    options: &CompileOptions,
) -> Result<DialogueSession, QdlError> {
    open_session(&dialogue.source, options)
}

pub(crate) fn resume_session_for_state(
    dialogue: &LoadedDialogue,
    options: &CompileOptions,
    state: &PlayerStateV1,
) -> Result<DialogueSession, QdlError> {
    resume_session(ResumeSessionOptions {
        source: dialogue.source.clone(),
        active_header: state.active_header.clone(),
        compile: options.clone(),
    })
}

pub(crate) fn save_session_state(
    path: &Path,
    session: &DialogueSession,
    dialogue: &LoadedDialogue,
    options: &CompileOptions,
) -> Result<(), QdlError> {
    let state = PlayerStateV1 {
        schema_version: PLAYER_STATE_SCHEMA.to_string(),
        source_path: dialogue.path.to_string_lossy().to_string(),
        host_commands: options.host_commands.iter().cloned().collect(),
        strict_references: options.strict_references,
        active_header: session.tree().active_header().to_string(),
    };
    save_player_state(path, &state)?;
    info!("saved \"{}\" to {}", state.active_header, path.display());
    Ok(())
}

/// Reloads the dialogue a state file points at, with the options it was saved with.
pub(crate) fn load_session_from_state(
    path: &Path,
) -> Result<(LoadedDialogue, CompileOptions, DialogueSession), QdlError> {
    let state = load_player_state(path)?;
    let dialogue = load_dialogue(&state.source_path)?;
    let options = options_from_state(&state);
    let session = resume_session_for_state(&dialogue, &options, &state)?;
    Ok((dialogue, options, session))
}

pub(crate) fn load_session_from_state_for_dialogue(
    path: &Path,
    dialogue: &LoadedDialogue,
    options: &CompileOptions,
) -> Result<(PlayerStateV1, DialogueSession), QdlError> {
    let state = load_player_state(path)?;
    let expected = dialogue.path.to_string_lossy();
    if state.source_path != expected {
        return Err(QdlError::new(
            "TUI_STATE_SOURCE_MISMATCH",
            format!(
                "State source mismatch. expected={} actual={}",
                expected, state.source_path
            ),
        ));
    }
    let session = resume_session_for_state(dialogue, options, &state)?;
    Ok((state, session))
}

/// Prints the turn; the state file is only written while there is a branch to come back to.
pub(crate) fn emit_turn_with_saved_state(
    session: &DialogueSession,
    turn: TurnResult,
    state_out: &str,
    dialogue: &LoadedDialogue,
    options: &CompileOptions,
) -> Result<i32, QdlError> {
    if turn.event == TurnEvent::Branch {
        save_session_state(Path::new(state_out), session, dialogue, options)?;
        emit_turn(turn, Some(state_out.to_string()));
        return Ok(0);
    }

    emit_turn(turn, None);
    Ok(0)
}

pub(crate) fn emit_session(
    session: &DialogueSession,
    external: Option<qdl_core::ExternalCommand>,
    state_out: &str,
    dialogue: &LoadedDialogue,
    options: &CompileOptions,
) -> Result<i32, QdlError> {
    let turn = describe_turn(session, external)?;
    emit_turn_with_saved_state(session, turn, state_out, dialogue, options)
}
