use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use qdl_api::CompileOptions;
use qdl_runtime::DialogueSession;

use crate::{load_dialogue, open_session_for_dialogue, LoadedDialogue};

pub(crate) const GREETING: &str = r#"[Greeting]{"start""Hello.""Bye"(exit ;)}"#;

pub(crate) fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be monotonic")
        .as_nanos();
    std::env::temp_dir().join(format!("qdl-rs-{}-{}", name, nanos))
}

pub(crate) fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent should be created");
    }
    fs::write(path, content).expect("file should be written");
}

pub(crate) fn demo_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
        .join("dialogues")
}

pub(crate) fn demo_options() -> CompileOptions {
    CompileOptions::with_host_commands(["give", "play_sound"])
}

pub(crate) fn demo_dialogue(name: &str) -> LoadedDialogue {
    load_dialogue(demo_dir().join(name).to_string_lossy().as_ref()).expect("demo should load")
}

pub(crate) fn tavern_session() -> DialogueSession {
    open_session_for_dialogue(&demo_dialogue("tavern.qdl"), &demo_options())
        .expect("tavern should compile")
}
