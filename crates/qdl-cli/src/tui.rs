use log::debug;
use qdl_core::QdlError;
use qdl_runtime::{DialogueIo, DialogueSession};

use crate::tui_actions::{action_from_error, apply_action};
use crate::{TuiCommandAction, TuiCommandContext};

/// A terminal that can also show status and the end screen.
pub(crate) trait TuiFrontend: DialogueIo {
    fn set_status(&mut self, status: &str) -> Result<(), QdlError>;

    /// Blocks until the player picks what to do after the dialogue ended.
    fn wait_at_end(&mut self) -> Result<TuiCommandAction, QdlError>;
}

/// Plays turns until the player quits. Player commands arrive as action
/// signals from the frontend; any other error ends the session.
pub(crate) fn drive_session<F: TuiFrontend>(
    context: &TuiCommandContext<'_>,
    session: &mut DialogueSession,
    frontend: &mut F,
) -> Result<i32, QdlError> {
    loop {
        let action = if session.is_finished() {
            frontend.wait_at_end()?
        } else {
            match session.run_turn(frontend) {
                Ok(external) => {
                    let status = external
                        .map(|external| format!("{} {}", external.command.name(), external.argument))
                        .unwrap_or_default();
                    frontend.set_status(&status)?;
                    continue;
                }
                Err(error) => match action_from_error(&error) {
                    Some(action) => action,
                    None => return Err(error),
                },
            }
        };

        debug!("tui action {:?}", action);
        if action == TuiCommandAction::Quit {
            return Ok(0);
        }
        let status = match apply_action(context, session, action) {
            Ok(status) => status,
            Err(error) => error.message,
        };
        frontend.set_status(&status)?;
    }
}

#[cfg(coverage)]
pub(super) fn run_tui_mode(
    context: &TuiCommandContext<'_>,
    session: &mut DialogueSession,
) -> Result<i32, QdlError> {
    super::run_tui_line_mode(context, session)
}

#[cfg(not(coverage))]
mod rich {
    use std::io;
    use std::time::Duration;

    use crossterm::event::{self, Event, KeyEventKind};
    use crossterm::terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
    };
    use crossterm::ExecutableCommand;
    use ratatui::backend::CrosstermBackend;
    use ratatui::Terminal;
    use qdl_core::{DialogueBranch, QdlError};
    use qdl_runtime::{DialogueIo, DialogueSession, NavKey};

    use super::{drive_session, TuiFrontend};
    use crate::tui_actions::{action_signal, map_key_event, KeyInput};
    use crate::tui_render::{render_tui, TuiHeader};
    use crate::tui_state::TuiUiState;
    use crate::{map_tui_io, TuiCommandAction, TuiCommandContext};

    const TYPEWRITER_CHARS_PER_SECOND: usize = 60;
    const TYPEWRITER_TICK_MS: u64 = (1000 / TYPEWRITER_CHARS_PER_SECOND) as u64;

    struct TuiTerminal {
        terminal: Terminal<CrosstermBackend<io::Stdout>>,
    }

    impl TuiTerminal {
        fn new() -> Result<Self, QdlError> {
            enable_raw_mode().map_err(map_tui_io)?;
            io::stdout()
                .execute(EnterAlternateScreen)
                .map_err(map_tui_io)?;
            let backend = CrosstermBackend::new(io::stdout());
            let terminal = Terminal::new(backend).map_err(map_tui_io)?;
            Ok(Self { terminal })
        }
    }

    impl Drop for TuiTerminal {
        fn drop(&mut self) {
            let _ = disable_raw_mode();
            let _ = io::stdout().execute(LeaveAlternateScreen);
        }
    }

    struct RatatuiFrontend {
        terminal: TuiTerminal,
        ui: TuiUiState,
        title: String,
        source: String,
        state_file: String,
    }

    impl RatatuiFrontend {
        fn draw(&mut self) -> Result<(), QdlError> {
            let header = TuiHeader {
                title: &self.title,
                source: &self.source,
                state_file: &self.state_file,
            };
            let ui = &self.ui;
            self.terminal
                .terminal
                .draw(|frame| render_tui(frame, ui, &header))
                .map_err(map_tui_io)?;
            Ok(())
        }

        /// Next key press, advancing the typewriter while waiting.
        fn next_input(&mut self) -> Result<KeyInput, QdlError> {
            let tick = Duration::from_millis(TYPEWRITER_TICK_MS);
            loop {
                self.draw()?;
                if self.ui.typing_in_progress() && !event::poll(tick).map_err(map_tui_io)? {
                    self.ui.advance_typewriter();
                    continue;
                }
                let Event::Key(key) = event::read().map_err(map_tui_io)? else {
                    continue;
                };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match map_key_event(key) {
                    KeyInput::Action(TuiCommandAction::Help) => {
                        self.ui.help_visible = !self.ui.help_visible;
                    }
                    KeyInput::Nav(NavKey::Confirm) if self.ui.typing_in_progress() => {
                        self.ui.finish_typing();
                    }
                    KeyInput::Nav(NavKey::Up | NavKey::Down) if self.ui.typing_in_progress() => {
                        self.ui.status = "text streaming...".to_string();
                    }
                    input => return Ok(input),
                }
            }
        }
    }

    impl DialogueIo for RatatuiFrontend {
        fn render(&mut self, branch: &DialogueBranch, cursor: usize) -> Result<(), QdlError> {
            self.ui.show_branch(branch, cursor);
            self.draw()
        }

        fn read_key(&mut self) -> Result<NavKey, QdlError> {
            match self.next_input()? {
                KeyInput::Nav(NavKey::Confirm) => {
                    self.ui.start_new_turn();
                    Ok(NavKey::Confirm)
                }
                KeyInput::Nav(key) => Ok(key),
                KeyInput::Action(action) => {
                    if matches!(action, TuiCommandAction::Load | TuiCommandAction::Restart) {
                        self.ui.start_new_turn();
                    }
                    Err(action_signal(action))
                }
            }
        }
    }

    impl TuiFrontend for RatatuiFrontend {
        fn set_status(&mut self, status: &str) -> Result<(), QdlError> {
            self.ui.status = if status.is_empty() {
                "ready".to_string()
            } else {
                status.to_string()
            };
            self.draw()
        }

        fn wait_at_end(&mut self) -> Result<TuiCommandAction, QdlError> {
            self.ui.mark_ended();
            loop {
                match self.next_input()? {
                    KeyInput::Action(action) => return Ok(action),
                    KeyInput::Nav(_) => {
                        self.ui.status = "dialogue ended: r restart | l load | q quit".to_string();
                    }
                }
            }
        }
    }

    pub(super) fn run_tui_ratatui_mode(
        context: &TuiCommandContext<'_>,
        session: &mut DialogueSession,
    ) -> Result<i32, QdlError> {
        let mut frontend = RatatuiFrontend {
            terminal: TuiTerminal::new()?,
            ui: TuiUiState::new(),
            title: session.tree().title().to_string(),
            source: context.dialogue.path.to_string_lossy().to_string(),
            state_file: context.state_file.to_string(),
        };
        drive_session(context, session, &mut frontend)
    }
}

#[cfg(not(coverage))]
pub(super) fn run_tui_mode(
    context: &TuiCommandContext<'_>,
    session: &mut DialogueSession,
) -> Result<i32, QdlError> {
    use std::io::IsTerminal;

    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return super::run_tui_line_mode(context, session);
    }
    rich::run_tui_ratatui_mode(context, session)
}
