use log::{debug, info};
use qdl_core::{DialogueBranch, DialogueTree, ExternalCommand, QdlError, EXIT_HEADER};

use crate::interpreter::apply_choice;
use crate::navigation::{run_turn, DialogueIo};

/// A running conversation over one compiled tree.
#[derive(Debug, Clone)]
pub struct DialogueSession {
    tree: DialogueTree,
    turns: usize,
}

impl DialogueSession {
    pub fn new(tree: DialogueTree) -> Self {
        info!(
            "session started for \"{}\" at \"{}\"",
            tree.title(),
            tree.active_header()
        );
        Self { tree, turns: 0 }
    }

    pub fn tree(&self) -> &DialogueTree {
        &self.tree
    }

    pub fn into_tree(self) -> DialogueTree {
        self.tree
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn active_branch(&self) -> Result<&DialogueBranch, QdlError> {
        self.tree.active_branch()
    }

    pub fn is_finished(&self) -> bool {
        self.tree.is_exited()
    }

    pub fn apply_choice(&mut self, index: usize) -> Result<Option<ExternalCommand>, QdlError> {
        let external = apply_choice(&mut self.tree, index)?;
        self.after_turn(&external);
        Ok(external)
    }

    pub fn run_turn(&mut self, io: &mut dyn DialogueIo) -> Result<Option<ExternalCommand>, QdlError> {
        let external = run_turn(&mut self.tree, io)?;
        self.after_turn(&external);
        Ok(external)
    }

    /// Resumes at a header saved from an earlier session of the same tree.
    pub fn restore_active_header(&mut self, header: &str) -> Result<(), QdlError> {
        if header != EXIT_HEADER && self.tree.branch(header).is_none() {
            return Err(QdlError::new(
                "QDL_RUNTIME_BRANCH_NOT_FOUND",
                format!(
                    "Cannot resume \"{}\" at unknown branch \"{}\".",
                    self.tree.title(),
                    header
                ),
            ));
        }
        self.tree.set_active_header(header);
        Ok(())
    }

    fn after_turn(&mut self, external: &Option<ExternalCommand>) {
        self.turns += 1;
        if let Some(external) = external {
            debug!(
                "turn {} forwards {} \"{}\"",
                self.turns,
                external.command.name(),
                external.argument
            );
        }
        if self.is_finished() {
            info!("session for \"{}\" ended after {} turns", self.tree.title(), self.turns);
        }
    }
}
