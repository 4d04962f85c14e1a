use std::io::{self, BufRead, Write};

use qdl_core::{DialogueBranch, QdlError};
use qdl_runtime::{DialogueIo, DialogueSession, NavKey};

use crate::tui::{drive_session, TuiFrontend};
use crate::tui_actions::{action_signal, map_line_input, KeyInput, LINE_HELP_TEXT};
use crate::{map_tui_io, TuiCommandAction, TuiCommandContext};

pub(crate) fn run_tui_line_mode(
    context: &TuiCommandContext<'_>,
    session: &mut DialogueSession,
) -> Result<i32, QdlError> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();
    run_tui_line_mode_with_io(context, session, &mut reader, &mut writer)
}

pub(crate) fn run_tui_line_mode_with_io(
    context: &TuiCommandContext<'_>,
    session: &mut DialogueSession,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<i32, QdlError> {
    writeln!(writer, "QDL TUI | {}", session.tree().title()).map_err(map_tui_io)?;
    writeln!(writer, "{}", LINE_HELP_TEXT).map_err(map_tui_io)?;
    let mut frontend = LineFrontend {
        reader,
        writer,
        message_shown: false,
    };
    drive_session(context, session, &mut frontend)
}

/// Plain stdin/stdout frontend. One line of input is one key.
struct LineFrontend<'a> {
    reader: &'a mut dyn BufRead,
    writer: &'a mut dyn Write,
    message_shown: bool,
}

impl LineFrontend<'_> {
    fn read_input(&mut self) -> Result<KeyInput, QdlError> {
        loop {
            let Some(raw) = prompt_input_from("> ", self.reader, self.writer)? else {
                return Ok(KeyInput::Action(TuiCommandAction::Quit));
            };
            match map_line_input(&raw) {
                KeyInput::Action(TuiCommandAction::Help) => {
                    writeln!(self.writer, "{}", LINE_HELP_TEXT).map_err(map_tui_io)?;
                }
                input => return Ok(input),
            }
        }
    }
}

impl DialogueIo for LineFrontend<'_> {
    fn render(&mut self, branch: &DialogueBranch, cursor: usize) -> Result<(), QdlError> {
        if !self.message_shown {
            writeln!(self.writer).map_err(map_tui_io)?;
            writeln!(self.writer, "{}", branch.message()).map_err(map_tui_io)?;
            self.message_shown = true;
        }
        for (index, object) in branch.objects().iter().enumerate() {
            let marker = if index == cursor { '>' } else { ' ' };
            writeln!(self.writer, "{} [{}] {}", marker, index, object.response())
                .map_err(map_tui_io)?;
        }
        Ok(())
    }

    fn read_key(&mut self) -> Result<NavKey, QdlError> {
        match self.read_input()? {
            KeyInput::Nav(NavKey::Confirm) => {
                self.message_shown = false;
                Ok(NavKey::Confirm)
            }
            KeyInput::Nav(key) => Ok(key),
            KeyInput::Action(action) => {
                self.message_shown = false;
                Err(action_signal(action))
            }
        }
    }
}

impl TuiFrontend for LineFrontend<'_> {
    fn set_status(&mut self, status: &str) -> Result<(), QdlError> {
        if status.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "* {}", status).map_err(map_tui_io)
    }

    fn wait_at_end(&mut self) -> Result<TuiCommandAction, QdlError> {
        writeln!(self.writer).map_err(map_tui_io)?;
        writeln!(self.writer, "[END]").map_err(map_tui_io)?;
        loop {
            match self.read_input()? {
                KeyInput::Action(action) => {
                    self.message_shown = false;
                    return Ok(action);
                }
                KeyInput::Nav(_) => {
                    writeln!(self.writer, "dialogue ended: :restart :load :quit")
                        .map_err(map_tui_io)?;
                }
            }
        }
    }
}

/// Reads one line; `None` at end of input.
pub(crate) fn prompt_input_from(
    prefix: &str,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<Option<String>, QdlError> {
    write!(writer, "{}", prefix).map_err(map_tui_io)?;
    writer.flush().map_err(map_tui_io)?;
    let mut input = String::new();
    let read = reader.read_line(&mut input).map_err(map_tui_io)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(&['\r', '\n'][..]).to_string()))
}

#[cfg(test)]
mod line_tui_tests {
    use super::*;
    use crate::cli_test_support::*;
    use crate::load_player_state;
    use std::io::Cursor;

    fn run_lines(
        dialogue: &str,
        input: &str,
        state_file: &str,
    ) -> (Result<i32, QdlError>, String, DialogueSession) {
        let dialogue = demo_dialogue(dialogue);
        let options = demo_options();
        let context = TuiCommandContext {
            state_file,
            dialogue: &dialogue,
            options: &options,
        };
        let mut session = crate::open_session_for_dialogue(&dialogue, &options).expect("session");
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut writer = Vec::new();
        let result = run_tui_line_mode_with_io(&context, &mut session, &mut reader, &mut writer);
        (result, String::from_utf8_lossy(&writer).to_string(), session)
    }

    #[test]
    fn greeting_plays_to_end_and_quits() {
        let state = temp_path("line-greeting.json");
        let (result, output, session) =
            run_lines("greeting.qdl", "\n:quit\n", state.to_string_lossy().as_ref());
        assert_eq!(result.expect("line mode"), 0);
        assert!(output.contains("Hello."));
        assert!(output.contains("> [0] Bye"));
        assert!(output.contains("[END]"));
        assert!(session.is_finished());
    }

    #[test]
    fn navigation_external_commands_and_save() {
        let state = temp_path("line-tavern.json");
        let state_file = state.to_string_lossy().to_string();
        let (result, output, session) = run_lines("tavern.qdl", "j\nk\n\n:save\n", &state_file);

        assert_eq!(result.expect("eof quits"), 0);
        assert!(output.contains("> [1] Any news?"));
        assert!(output.contains("* give ale"));
        assert!(output.contains("Here you go. Anything else?"));
        assert!(output.contains(&format!("* saved to {}", state_file)));
        assert_eq!(session.tree().active_header(), "ale");

        let saved = load_player_state(&state).expect("saved state");
        assert_eq!(saved.active_header, "ale");
    }

    #[test]
    fn restart_after_end_returns_to_first_branch() {
        let state = temp_path("line-restart.json");
        let (result, output, session) = run_lines(
            "greeting.qdl",
            "\nj\n:restart\n",
            state.to_string_lossy().as_ref(),
        );
        assert_eq!(result.expect("eof quits"), 0);
        assert!(output.contains("dialogue ended"));
        assert!(output.contains("* restarted"));
        assert!(!session.is_finished());
    }
}
