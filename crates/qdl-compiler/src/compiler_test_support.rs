use qdl_core::{DialogueTree, QdlError};

use crate::{compile, CompileOptions};

pub(crate) const GREETING: &str = r#"[Greeting]{"start""Hello.""Bye"(exit ;)}"#;

pub(crate) const TAVERN: &str = r#"
[The Prancing Pony]
{ "start" "What'll it be?"
  "An ale, please." (give ale; goto ale;)
  "Any news?" (goto news;)
  "Nothing, thanks." (exit ;)
}
{ "ale" "Here you go. Anything else?"
  "Tell me the news." (goto news;)
  "That's all." (exit ;)
}
{ "news" "Strange folk on the road lately."
  "Strange how?" (become Worried Barkeep; goto start;)
  "Back to drinks." (goto start;)
}
"#;

pub(crate) fn tavern_options() -> CompileOptions {
    CompileOptions::with_host_commands(["give"])
}

pub(crate) fn strict() -> CompileOptions {
    CompileOptions {
        strict_references: true,
        ..CompileOptions::default()
    }
}

pub(crate) fn compile_default(source: &str) -> Result<DialogueTree, QdlError> {
    compile(source, &CompileOptions::default())
}
