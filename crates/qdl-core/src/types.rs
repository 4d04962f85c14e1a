use std::collections::HashMap;

use serde::Serialize;

use crate::error::QdlError;

/// Active header meaning "conversation over". Never valid as an authored header.
pub const EXIT_HEADER: &str = "__exit__";

pub const QUOTE: char = '"';
pub const TITLE_OPEN: char = '[';
pub const TITLE_CLOSE: char = ']';
pub const BRANCH_OPEN: char = '{';
pub const BRANCH_CLOSE: char = '}';
pub const COMMANDS_OPEN: char = '(';
pub const COMMANDS_CLOSE: char = ')';
pub const ARG_SEPARATOR: char = ' ';
pub const COMMAND_DELIMITER: char = ';';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "camelCase")]
pub enum DialogueCommand {
    Goto,
    Become,
    Exit,
    /// Host-defined command, forwarded verbatim.
    Host(String),
}

impl DialogueCommand {
    pub const GOTO: &'static str = "goto";
    pub const BECOME: &'static str = "become";
    pub const EXIT: &'static str = "exit";

    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            Self::GOTO => Some(Self::Goto),
            Self::BECOME => Some(Self::Become),
            Self::EXIT => Some(Self::Exit),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Goto => Self::GOTO,
            Self::Become => Self::BECOME,
            Self::Exit => Self::EXIT,
            Self::Host(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueObject {
    response: String,
    commands: Box<[DialogueCommand]>,
    args: Box<[String]>,
}

impl DialogueObject {
    pub fn new(
        response: String,
        commands: Box<[DialogueCommand]>,
        args: Box<[String]>,
    ) -> Result<Self, QdlError> {
        if commands.len() != args.len() {
            return Err(QdlError::new(
                "QDL_BUILD_COMMAND_ARG_MISMATCH",
                format!(
                    "Response \"{}\" has {} commands but {} arguments.",
                    response,
                    commands.len(),
                    args.len()
                ),
            ));
        }
        Ok(Self {
            response,
            commands,
            args,
        })
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn commands(&self) -> &[DialogueCommand] {
        &self.commands
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn command_pairs(&self) -> impl Iterator<Item = (&DialogueCommand, &str)> {
        self.commands
            .iter()
            .zip(self.args.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueBranch {
    header: String,
    message: String,
    objects: Box<[DialogueObject]>,
}

impl DialogueBranch {
    pub fn new(header: String, message: String, objects: Box<[DialogueObject]>) -> Self {
        Self {
            header,
            message,
            objects,
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn objects(&self) -> &[DialogueObject] {
        &self.objects
    }

    pub fn object(&self, index: usize) -> Option<&DialogueObject> {
        self.objects.get(index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueTree {
    title: String,
    active_header: String,
    branches: Box<[DialogueBranch]>,
    #[serde(skip)]
    header_index: HashMap<String, usize>,
}

impl DialogueTree {
    /// The first branch in source order becomes the active one.
    pub fn new(title: String, branches: Box<[DialogueBranch]>) -> Result<Self, QdlError> {
        let Some(first) = branches.first() else {
            return Err(QdlError::new(
                "QDL_BUILD_NO_BRANCHES",
                format!("Dialogue \"{}\" has no branches.", title),
            ));
        };
        let active_header = first.header.clone();

        let mut header_index = HashMap::with_capacity(branches.len());
        for (index, branch) in branches.iter().enumerate() {
            header_index.entry(branch.header.clone()).or_insert(index);
        }

        Ok(Self {
            title,
            active_header,
            branches,
            header_index,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn active_header(&self) -> &str {
        &self.active_header
    }

    /// Moves the active-branch cursor. The header is resolved lazily by
    /// [`DialogueTree::active_branch`].
    pub fn set_active_header(&mut self, header: impl Into<String>) {
        self.active_header = header.into();
    }

    pub fn is_exited(&self) -> bool {
        self.active_header == EXIT_HEADER
    }

    pub fn branches(&self) -> &[DialogueBranch] {
        &self.branches
    }

    /// First branch carrying `header`, in source order.
    pub fn branch(&self, header: &str) -> Option<&DialogueBranch> {
        self.header_index
            .get(header)
            .map(|&index| &self.branches[index])
    }

    pub fn active_branch(&self) -> Result<&DialogueBranch, QdlError> {
        self.branch(&self.active_header).ok_or_else(|| {
            QdlError::new(
                "QDL_RUNTIME_BRANCH_NOT_FOUND",
                format!(
                    "Active header \"{}\" does not name a branch in \"{}\".",
                    self.active_header, self.title
                ),
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCommand {
    pub command: DialogueCommand,
    pub argument: String,
}
