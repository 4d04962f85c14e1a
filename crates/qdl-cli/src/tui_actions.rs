use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use qdl_core::QdlError;
use qdl_runtime::{DialogueSession, NavKey};

use crate::{
    load_session_from_state_for_dialogue, open_session_for_dialogue, save_session_state,
    TuiCommandAction, TuiCommandContext,
};

/// Error code a frontend uses to hand a player command back to the session loop.
pub(crate) const TUI_ACTION_CODE: &str = "TUI_ACTION";

pub(crate) const HELP_TEXT: &str =
    "keys: up/k down/j move | enter/space choose | s save | l load | r restart | h help | q quit";
pub(crate) const LINE_HELP_TEXT: &str =
    "commands: k up | j down | empty line choose | :save :load :restart :help :quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyInput {
    Nav(NavKey),
    Action(TuiCommandAction),
}

impl TuiCommandAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Save => "save",
            Self::Load => "load",
            Self::Restart => "restart",
            Self::Quit => "quit",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "help" => Some(Self::Help),
            "save" => Some(Self::Save),
            "load" => Some(Self::Load),
            "restart" => Some(Self::Restart),
            "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

pub(crate) fn action_signal(action: TuiCommandAction) -> QdlError {
    QdlError::new(TUI_ACTION_CODE, action.as_str())
}

pub(crate) fn action_from_error(error: &QdlError) -> Option<TuiCommandAction> {
    if error.code != TUI_ACTION_CODE {
        return None;
    }
    TuiCommandAction::parse(&error.message)
}

pub(crate) fn map_key_event(key: KeyEvent) -> KeyInput {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyInput::Action(TuiCommandAction::Quit);
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => KeyInput::Action(TuiCommandAction::Quit),
        KeyCode::Char('h') => KeyInput::Action(TuiCommandAction::Help),
        KeyCode::Char('s') => KeyInput::Action(TuiCommandAction::Save),
        KeyCode::Char('l') => KeyInput::Action(TuiCommandAction::Load),
        KeyCode::Char('r') => KeyInput::Action(TuiCommandAction::Restart),
        KeyCode::Up | KeyCode::Char('k') => KeyInput::Nav(NavKey::Up),
        KeyCode::Down | KeyCode::Char('j') => KeyInput::Nav(NavKey::Down),
        KeyCode::Enter | KeyCode::Char(' ') => KeyInput::Nav(NavKey::Confirm),
        _ => KeyInput::Nav(NavKey::Other),
    }
}

pub(crate) fn map_line_input(raw: &str) -> KeyInput {
    if let Some(command) = raw.trim().strip_prefix(':') {
        return match TuiCommandAction::parse(command) {
            Some(action) => KeyInput::Action(action),
            None => KeyInput::Nav(NavKey::Other),
        };
    }
    match raw.trim() {
        "" => KeyInput::Nav(NavKey::Confirm),
        "k" | "up" => KeyInput::Nav(NavKey::Up),
        "j" | "down" => KeyInput::Nav(NavKey::Down),
        _ => KeyInput::Nav(NavKey::Other),
    }
}

/// Runs a player command against the live session and returns the status line to show.
pub(crate) fn apply_action(
    context: &TuiCommandContext<'_>,
    session: &mut DialogueSession,
    action: TuiCommandAction,
) -> Result<String, QdlError> {
    match action {
        TuiCommandAction::Save => {
            save_session_state(
                Path::new(context.state_file),
                session,
                context.dialogue,
                context.options,
            )?;
            Ok(format!("saved to {}", context.state_file))
        }
        TuiCommandAction::Load => {
            let (_state, resumed) = load_session_from_state_for_dialogue(
                Path::new(context.state_file),
                context.dialogue,
                context.options,
            )?;
            *session = resumed;
            Ok(format!("loaded from {}", context.state_file))
        }
        TuiCommandAction::Restart => {
            *session = open_session_for_dialogue(context.dialogue, context.options)?;
            Ok("restarted".to_string())
        }
        TuiCommandAction::Help => Ok(HELP_TEXT.to_string()),
        TuiCommandAction::Quit => Ok("bye".to_string()),
    }
}

#[cfg(test)]
mod tui_actions_tests {
    use super::*;
    use crate::cli_test_support::*;

    #[test]
    fn key_events_map_to_navigation_and_actions() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(map_key_event(key(KeyCode::Up)), KeyInput::Nav(NavKey::Up));
        assert_eq!(map_key_event(key(KeyCode::Char('j'))), KeyInput::Nav(NavKey::Down));
        assert_eq!(map_key_event(key(KeyCode::Char(' '))), KeyInput::Nav(NavKey::Confirm));
        assert_eq!(map_key_event(key(KeyCode::Tab)), KeyInput::Nav(NavKey::Other));
        assert_eq!(
            map_key_event(key(KeyCode::Esc)),
            KeyInput::Action(TuiCommandAction::Quit)
        );
        assert_eq!(
            map_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyInput::Action(TuiCommandAction::Quit)
        );
        assert_eq!(
            map_key_event(key(KeyCode::Char('s'))),
            KeyInput::Action(TuiCommandAction::Save)
        );
    }

    #[test]
    fn line_input_maps_commands_and_navigation() {
        assert_eq!(map_line_input(""), KeyInput::Nav(NavKey::Confirm));
        assert_eq!(map_line_input(" k "), KeyInput::Nav(NavKey::Up));
        assert_eq!(map_line_input("down"), KeyInput::Nav(NavKey::Down));
        assert_eq!(map_line_input("2"), KeyInput::Nav(NavKey::Other));
        assert_eq!(
            map_line_input(":restart"),
            KeyInput::Action(TuiCommandAction::Restart)
        );
        assert_eq!(map_line_input(":nope"), KeyInput::Nav(NavKey::Other));
    }

    #[test]
    fn action_signals_roundtrip_through_errors() {
        let signal = action_signal(TuiCommandAction::Load);
        assert_eq!(signal.code, TUI_ACTION_CODE);
        assert_eq!(action_from_error(&signal), Some(TuiCommandAction::Load));
        assert_eq!(action_from_error(&QdlError::new("TUI_IO", "load")), None);
    }

    #[test]
    fn apply_action_saves_loads_and_restarts() {
        let dialogue = demo_dialogue("tavern.qdl");
        let options = demo_options();
        let state_file = temp_path("tui-actions-state.json");
        let state_file = state_file.to_string_lossy().to_string();
        let context = TuiCommandContext {
            state_file: &state_file,
            dialogue: &dialogue,
            options: &options,
        };

        let mut session = tavern_session();
        session.apply_choice(1).expect("news");
        let status = apply_action(&context, &mut session, TuiCommandAction::Save).expect("save");
        assert!(status.starts_with("saved to"));

        apply_action(&context, &mut session, TuiCommandAction::Restart).expect("restart");
        assert_eq!(session.tree().active_header(), "start");

        apply_action(&context, &mut session, TuiCommandAction::Load).expect("load");
        assert_eq!(session.tree().active_header(), "news");
    }
}
