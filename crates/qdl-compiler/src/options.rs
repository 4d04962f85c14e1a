use std::collections::BTreeSet;

use qdl_core::{DialogueCommand, QdlError};

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Command names the host handles, accepted alongside `goto`, `become` and `exit`.
    pub host_commands: BTreeSet<String>,
    /// Reject duplicate headers and `goto` targets that name no branch.
    pub strict_references: bool,
}

impl CompileOptions {
    pub fn with_host_commands<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            host_commands: commands.into_iter().map(Into::into).collect(),
            strict_references: false,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), QdlError> {
        for name in &self.host_commands {
            if DialogueCommand::builtin(name).is_some() {
                return Err(QdlError::new(
                    "QDL_CONFIG_RESERVED_COMMAND",
                    format!("Host command \"{}\" shadows a builtin command.", name),
                ));
            }
            if name.is_empty() || name.chars().any(is_reserved_char) {
                return Err(QdlError::new(
                    "QDL_CONFIG_INVALID_COMMAND",
                    format!("Host command \"{}\" cannot be written in QDL.", name),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn resolve_command(&self, name: &str) -> Option<DialogueCommand> {
        DialogueCommand::builtin(name).or_else(|| {
            self.host_commands
                .contains(name)
                .then(|| DialogueCommand::Host(name.to_string()))
        })
    }
}

fn is_reserved_char(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '"' | '[' | ']' | '{' | '}' | '(' | ')' | ';')
}
