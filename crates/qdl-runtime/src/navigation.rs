use log::trace;
use qdl_core::{DialogueBranch, DialogueTree, ExternalCommand, QdlError};

use crate::interpreter::apply_choice;

/// Input the navigation shell understands. Hosts map their own key events
/// onto these; anything else becomes `Other` and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Confirm,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    AwaitingInput,
    Confirmed(usize),
}

/// Highlighted response of a branch. Movement clamps at both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceCursor {
    index: usize,
    len: usize,
}

impl ChoiceCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn handle(&mut self, key: NavKey) -> NavState {
        match key {
            NavKey::Up => {
                self.index = self.index.saturating_sub(1);
                NavState::AwaitingInput
            }
            NavKey::Down => {
                if self.index + 1 < self.len {
                    self.index += 1;
                }
                NavState::AwaitingInput
            }
            NavKey::Confirm if self.len > 0 => NavState::Confirmed(self.index),
            NavKey::Confirm | NavKey::Other => NavState::AwaitingInput,
        }
    }
}

/// Terminal collaborator for the navigation shell.
///
/// `read_key` blocks until a key arrives. An error from either method ends the
/// current turn; hosts use a dedicated error code to signal a user quit.
pub trait DialogueIo {
    fn render(&mut self, branch: &DialogueBranch, cursor: usize) -> Result<(), QdlError>;
    fn read_key(&mut self) -> Result<NavKey, QdlError>;
}

/// Shows the active branch and blocks until a response is confirmed.
pub fn read_choice(tree: &DialogueTree, io: &mut dyn DialogueIo) -> Result<usize, QdlError> {
    let branch = tree.active_branch()?;
    if branch.objects().is_empty() {
        return Err(QdlError::new(
            "QDL_RUNTIME_NO_CHOICES",
            format!("Branch \"{}\" has no responses to choose from.", branch.header()),
        ));
    }

    let mut cursor = ChoiceCursor::new(branch.objects().len());
    loop {
        io.render(branch, cursor.index())?;
        let key = io.read_key()?;
        trace!("key {:?} at {}", key, cursor.index());
        if let NavState::Confirmed(index) = cursor.handle(key) {
            return Ok(index);
        }
    }
}

/// One tick: read a choice for the active branch, then apply it.
pub fn run_turn(
    tree: &mut DialogueTree,
    io: &mut dyn DialogueIo,
) -> Result<Option<ExternalCommand>, QdlError> {
    let choice = read_choice(tree, io)?;
    apply_choice(tree, choice)
}
