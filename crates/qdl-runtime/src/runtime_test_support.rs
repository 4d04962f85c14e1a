use std::collections::VecDeque;

use qdl_compiler::{compile, CompileOptions};
use qdl_core::{DialogueBranch, DialogueTree, QdlError};

use crate::{DialogueIo, NavKey};

pub(crate) const GREETING: &str = r#"[Greeting]{"start""Hello.""Bye"(exit ;)}"#;

pub(crate) const TWO_BRANCHES: &str = r#"
[Road]
{ "start" "A fork in the road."
  "Go left." (goto second;)
  "Pick up the lantern." (play_sound clink; give lantern;)
  "Turn back." (exit ;)
}
{ "second" "You made it."
  "Who are you?" (become Traveller;)
  "Done." (exit ;)
}
"#;

pub(crate) const MARKET: &str = r#"
[Market]
{ "stall" "Fresh from the oven."
  "Bread, please." (give bread;)
  "Milk, please." (give milk;)
  "Just looking." (exit ;)
}
"#;

pub(crate) const DANGLING: &str = r#"[T]{"start""Hi.""Go"(goto missing;)}"#;

pub(crate) fn compile_tree(source: &str) -> DialogueTree {
    compile(
        source,
        &CompileOptions::with_host_commands(["give", "play_sound"]),
    )
    .expect("test dialogue should compile")
}

/// Replays a fixed key sequence and records what was shown.
pub(crate) struct ScriptedIo {
    keys: VecDeque<NavKey>,
    pub(crate) rendered: Vec<usize>,
    pub(crate) headers: Vec<String>,
}

impl ScriptedIo {
    pub(crate) fn new(keys: impl IntoIterator<Item = NavKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            rendered: Vec::new(),
            headers: Vec::new(),
        }
    }
}

impl DialogueIo for ScriptedIo {
    fn render(&mut self, branch: &DialogueBranch, cursor: usize) -> Result<(), QdlError> {
        self.rendered.push(cursor);
        self.headers.push(branch.header().to_string());
        Ok(())
    }

    fn read_key(&mut self) -> Result<NavKey, QdlError> {
        self.keys
            .pop_front()
            .ok_or_else(|| QdlError::new("TEST_NO_MORE_KEYS", "scripted keys exhausted"))
    }
}
