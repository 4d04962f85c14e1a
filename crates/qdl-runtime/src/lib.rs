mod interpreter;
mod navigation;
mod session;

pub use interpreter::apply_choice;
pub use navigation::{read_choice, run_turn, ChoiceCursor, DialogueIo, NavKey, NavState};
pub use session::DialogueSession;

#[cfg(test)]
mod runtime_test_support;
