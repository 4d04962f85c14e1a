use log::{debug, trace};
use qdl_core::{
    DialogueBranch, DialogueCommand, DialogueObject, DialogueTree, QdlError, ARG_SEPARATOR,
    BRANCH_CLOSE, BRANCH_OPEN, COMMANDS_CLOSE, COMMANDS_OPEN, COMMAND_DELIMITER, EXIT_HEADER,
    QUOTE, TITLE_CLOSE, TITLE_OPEN,
};
use qdl_parser::{NormalizedSource, SectionCounts};

use crate::options::CompileOptions;
use crate::slots::FixedSlots;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseMode {
    TreeTitle,
    BranchHeader,
    BranchMessage,
    ObjectResponse,
    ObjectCommand,
    ObjectArg,
}

#[derive(Debug)]
struct PendingBranch {
    opened: bool,
    header: Option<String>,
    message: Option<String>,
    objects: FixedSlots<DialogueObject>,
}

#[derive(Debug)]
struct PendingObject {
    response: Option<String>,
    command: Option<DialogueCommand>,
    commands: FixedSlots<DialogueCommand>,
    args: FixedSlots<String>,
}

struct TreeBuilder<'a> {
    source: &'a NormalizedSource,
    counts: &'a SectionCounts,
    options: &'a CompileOptions,
    mode: ParseMode,
    in_string: bool,
    buffer: String,
    /// Buffer length up to the end of the last quoted run; trimming stops there.
    quoted_len: usize,
    position: usize,
    current: char,
    title_open: bool,
    title: Option<String>,
    branches: FixedSlots<DialogueBranch>,
    branch: Option<PendingBranch>,
    object: Option<PendingObject>,
}

/// Builds the dialogue tree in one forward pass over normalized source,
/// filling tables pre-sized by `counts`.
pub fn build_tree(
    source: &NormalizedSource,
    counts: &SectionCounts,
    options: &CompileOptions,
) -> Result<DialogueTree, QdlError> {
    let mut builder = TreeBuilder {
        source,
        counts,
        options,
        mode: ParseMode::TreeTitle,
        in_string: false,
        buffer: String::new(),
        quoted_len: 0,
        position: 0,
        current: ' ',
        title_open: false,
        title: None,
        branches: FixedSlots::with_capacity(counts.branch_count(), "branches"),
        branch: None,
        object: None,
    };

    for (position, ch) in source.as_str().chars().enumerate() {
        builder.position = position;
        builder.current = ch;
        builder.step(ch)?;
    }
    builder.finish()
}

impl TreeBuilder<'_> {
    fn step(&mut self, ch: char) -> Result<(), QdlError> {
        if ch == QUOTE {
            if self.in_string {
                self.in_string = false;
                self.on_string_closed()?;
            } else {
                self.on_string_opened()?;
                self.in_string = true;
            }
            return Ok(());
        }
        if self.in_string {
            self.buffer.push(ch);
            return Ok(());
        }

        match ch {
            TITLE_OPEN => self.open_title(),
            TITLE_CLOSE => self.close_title(),
            BRANCH_OPEN => self.open_branch(),
            BRANCH_CLOSE => self.close_branch(),
            COMMANDS_OPEN => self.open_commands(),
            COMMANDS_CLOSE => self.close_commands(),
            COMMAND_DELIMITER => self.end_command(),
            ARG_SEPARATOR if self.mode == ParseMode::ObjectCommand => self.separate_argument(),
            ch if ch.is_whitespace()
                && self.buffer.is_empty()
                && matches!(self.mode, ParseMode::ObjectCommand | ParseMode::ObjectArg) =>
            {
                Ok(())
            }
            _ => {
                self.buffer.push(ch);
                Ok(())
            }
        }
    }

    fn error(&self, code: &str, message: impl Into<String>) -> QdlError {
        match self.source.origin(self.position) {
            Some(origin) => QdlError::at(
                code,
                message,
                origin.index,
                self.current,
                origin.location,
            ),
            None => QdlError::new(code, message),
        }
    }

    fn take_buffer(&mut self) -> String {
        self.quoted_len = 0;
        std::mem::take(&mut self.buffer)
    }

    fn reject_stray_text(&self) -> Result<(), QdlError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        Err(self.error(
            "QDL_BUILD_STRAY_TEXT",
            format!("Text \"{}\" is not quoted.", self.buffer),
        ))
    }

    /// Headers, messages and responses are whole strings.
    fn on_string_opened(&mut self) -> Result<(), QdlError> {
        match self.mode {
            ParseMode::BranchHeader | ParseMode::BranchMessage | ParseMode::ObjectResponse => {
                self.reject_stray_text()
            }
            ParseMode::TreeTitle | ParseMode::ObjectCommand | ParseMode::ObjectArg => Ok(()),
        }
    }

    fn on_string_closed(&mut self) -> Result<(), QdlError> {
        match self.mode {
            ParseMode::BranchHeader => {
                let opened = self.branch.as_ref().is_some_and(|branch| branch.opened);
                if !opened {
                    return Err(self.error(
                        "QDL_BUILD_STRAY_TEXT",
                        "String appears outside of a branch.",
                    ));
                }
                let header = self.take_buffer();
                if header.is_empty() {
                    return Err(self.error("QDL_BUILD_MISSING_HEADER", "Branch header is empty."));
                }
                if header == EXIT_HEADER {
                    return Err(self.error(
                        "QDL_BUILD_RESERVED_HEADER",
                        format!("Header \"{}\" is reserved for ending a dialogue.", header),
                    ));
                }
                if let Some(branch) = self.branch.as_mut() {
                    branch.header = Some(header);
                }
                self.mode = ParseMode::BranchMessage;
            }
            ParseMode::BranchMessage => {
                let message = self.take_buffer();
                if let Some(branch) = self.branch.as_mut() {
                    branch.message = Some(message);
                }
                self.mode = ParseMode::ObjectResponse;
                self.allocate_object()?;
            }
            ParseMode::ObjectArg => self.quoted_len = self.buffer.len(),
            ParseMode::TreeTitle | ParseMode::ObjectResponse | ParseMode::ObjectCommand => {}
        }
        Ok(())
    }

    fn open_title(&mut self) -> Result<(), QdlError> {
        if self.title.is_some() || self.title_open {
            return Err(self.error("QDL_BUILD_DUPLICATE_TITLE", "Dialogue already has a title."));
        }
        self.reject_stray_text()?;
        self.title_open = true;
        self.mode = ParseMode::TreeTitle;
        Ok(())
    }

    fn close_title(&mut self) -> Result<(), QdlError> {
        let title = self.take_buffer();
        if title.trim().is_empty() {
            return Err(self.error("QDL_BUILD_MISSING_TITLE", "Dialogue title is empty."));
        }
        debug!("title: {}", title);
        self.title = Some(title);
        self.title_open = false;
        self.mode = ParseMode::BranchHeader;
        self.allocate_branch()
    }

    fn allocate_branch(&mut self) -> Result<(), QdlError> {
        if self.branches.remaining() == 0 {
            self.branch = None;
            return Ok(());
        }
        let index = self.branches.len();
        let Some(objects) = self.counts.object_count(index) else {
            return Err(self.error(
                "QDL_BUILD_CAPACITY",
                format!("No object count for branch {}.", index),
            ));
        };
        self.branch = Some(PendingBranch {
            opened: false,
            header: None,
            message: None,
            objects: FixedSlots::with_capacity(objects, "objects"),
        });
        Ok(())
    }

    fn allocate_object(&mut self) -> Result<(), QdlError> {
        let branch_index = self.branches.len();
        let Some(branch) = self.branch.as_ref() else {
            return Err(self.error("QDL_BUILD_NO_BRANCH", "No branch is being built."));
        };
        if branch.objects.remaining() == 0 {
            self.object = None;
            return Ok(());
        }
        let object_index = branch.objects.len();
        let Some(commands) = self.counts.command_count(branch_index, object_index) else {
            return Err(self.error(
                "QDL_BUILD_CAPACITY",
                format!(
                    "No command count for branch {} object {}.",
                    branch_index, object_index
                ),
            ));
        };
        self.object = Some(PendingObject {
            response: None,
            command: None,
            commands: FixedSlots::with_capacity(commands, "commands"),
            args: FixedSlots::with_capacity(commands, "arguments"),
        });
        Ok(())
    }

    fn open_branch(&mut self) -> Result<(), QdlError> {
        if self.title.is_none() {
            return Err(self.error(
                "QDL_BUILD_MISSING_TITLE",
                "Branch starts before the dialogue title.",
            ));
        }
        self.reject_stray_text()?;
        match self.branch.as_mut() {
            Some(branch) if !branch.opened => {
                branch.opened = true;
                self.mode = ParseMode::BranchHeader;
                Ok(())
            }
            _ => Err(self.error("QDL_BUILD_CAPACITY", "More branches than counted.")),
        }
    }

    fn close_branch(&mut self) -> Result<(), QdlError> {
        match self.mode {
            ParseMode::BranchHeader => {
                return Err(self.error("QDL_BUILD_MISSING_HEADER", "Branch has no header."))
            }
            ParseMode::BranchMessage => {
                return Err(self.error("QDL_BUILD_MISSING_MESSAGE", "Branch has no message."))
            }
            ParseMode::ObjectResponse => {}
            ParseMode::TreeTitle | ParseMode::ObjectCommand | ParseMode::ObjectArg => {
                return Err(self.error("QDL_BUILD_UNEXPECTED", "Branch closes mid-structure."))
            }
        }
        if !self.buffer.is_empty() {
            return Err(self.error(
                "QDL_BUILD_MISSING_COMMAND_LIST",
                format!("Response \"{}\" has no command list.", self.buffer),
            ));
        }
        if self.object.is_some() {
            return Err(self.error("QDL_BUILD_CAPACITY", "Fewer objects than counted."));
        }

        let Some(branch) = self.branch.take() else {
            return Err(self.error("QDL_BUILD_NO_BRANCH", "No branch is being built."));
        };
        let (Some(header), Some(message)) = (branch.header, branch.message) else {
            return Err(self.error("QDL_BUILD_MISSING_HEADER", "Branch is incomplete."));
        };
        if branch.objects.len() == 0 {
            return Err(self.error(
                "QDL_BUILD_EMPTY_OBJECT_LIST",
                format!("Branch \"{}\" offers no responses.", header),
            ));
        }
        let objects = branch.objects.finish()?;
        debug!("branch \"{}\" with {} objects", header, objects.len());
        self.branches
            .push(DialogueBranch::new(header, message, objects))?;
        self.mode = ParseMode::BranchHeader;
        self.allocate_branch()
    }

    fn open_commands(&mut self) -> Result<(), QdlError> {
        match self.mode {
            ParseMode::ObjectResponse => {}
            ParseMode::BranchHeader => {
                return Err(self.error("QDL_BUILD_MISSING_HEADER", "Branch has no header."))
            }
            ParseMode::BranchMessage => {
                return Err(self.error("QDL_BUILD_MISSING_MESSAGE", "Branch has no message."))
            }
            ParseMode::TreeTitle | ParseMode::ObjectCommand | ParseMode::ObjectArg => {
                return Err(self.error("QDL_BUILD_UNEXPECTED", "Command list opens mid-structure."))
            }
        }
        let response = self.take_buffer();
        let Some(object) = self.object.as_mut() else {
            return Err(self.error("QDL_BUILD_CAPACITY", "More objects than counted."));
        };
        if response.is_empty() {
            return Err(self.error(
                "QDL_BUILD_MISSING_RESPONSE",
                "Command list has no response line before it.",
            ));
        }
        object.response = Some(response);
        self.mode = ParseMode::ObjectCommand;
        Ok(())
    }

    fn separate_argument(&mut self) -> Result<(), QdlError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let name = self.take_buffer();
        let Some(command) = self.options.resolve_command(&name) else {
            return Err(self.error(
                "QDL_BUILD_UNKNOWN_COMMAND",
                format!("Unknown command \"{}\".", name),
            ));
        };
        trace!("command {}", command.name());
        if let Some(object) = self.object.as_mut() {
            object.command = Some(command);
        }
        self.mode = ParseMode::ObjectArg;
        Ok(())
    }

    fn end_command(&mut self) -> Result<(), QdlError> {
        if self.mode != ParseMode::ObjectArg {
            return Err(self.unrecognized_token());
        }
        let keep = self.buffer.trim_end().len().max(self.quoted_len);
        self.buffer.truncate(keep);
        let arg = self.take_buffer();
        let Some(object) = self.object.as_mut() else {
            return Err(self.error("QDL_BUILD_NO_OBJECT", "No object is being built."));
        };
        let Some(command) = object.command.take() else {
            return Err(self.error("QDL_BUILD_NO_OBJECT", "Argument without a command."));
        };
        object.commands.push(command)?;
        object.args.push(arg)?;
        self.mode = ParseMode::ObjectCommand;
        Ok(())
    }

    fn unrecognized_token(&self) -> QdlError {
        self.error(
            "QDL_BUILD_UNRECOGNIZED_TOKEN",
            format!(
                "Expected \"<command> <argument>;\", found \"{}\" with no argument separator.",
                self.buffer
            ),
        )
    }

    fn close_commands(&mut self) -> Result<(), QdlError> {
        match self.mode {
            ParseMode::ObjectCommand if self.buffer.is_empty() => {}
            ParseMode::ObjectCommand => return Err(self.unrecognized_token()),
            ParseMode::ObjectArg => {
                return Err(self.error(
                    "QDL_BUILD_UNTERMINATED_COMMAND",
                    "Command is missing its closing ';'.",
                ))
            }
            _ => return Err(self.error("QDL_BUILD_UNEXPECTED", "Command list closes mid-structure.")),
        }

        let Some(object) = self.object.take() else {
            return Err(self.error("QDL_BUILD_NO_OBJECT", "No object is being built."));
        };
        let Some(response) = object.response else {
            return Err(self.error("QDL_BUILD_MISSING_RESPONSE", "Object has no response."));
        };
        let built = DialogueObject::new(response, object.commands.finish()?, object.args.finish()?)?;
        let Some(branch) = self.branch.as_mut() else {
            return Err(self.error("QDL_BUILD_NO_BRANCH", "No branch is being built."));
        };
        branch.objects.push(built)?;
        self.mode = ParseMode::ObjectResponse;
        self.allocate_object()
    }

    fn finish(self) -> Result<DialogueTree, QdlError> {
        let Some(title) = self.title else {
            return Err(QdlError::new(
                "QDL_BUILD_MISSING_TITLE",
                "Dialogue has no [title].",
            ));
        };
        if !self.buffer.is_empty() {
            return Err(QdlError::new(
                "QDL_BUILD_STRAY_TEXT",
                format!("Trailing text \"{}\" after the last branch.", self.buffer),
            ));
        }
        if self.branch.as_ref().is_some_and(|branch| branch.opened) || self.object.is_some() {
            return Err(QdlError::new(
                "QDL_BUILD_UNTERMINATED",
                "Input ends inside a branch.",
            ));
        }
        let branches = self.branches.finish()?;
        DialogueTree::new(title, branches)
    }
}
