use std::fs;
use std::path::Path;

use log::debug;
use qdl_compiler::compile;
use qdl_core::{DialogueTree, QdlError};
use qdl_runtime::DialogueSession;

pub use qdl_compiler::CompileOptions;

#[derive(Debug, Clone)]
pub struct ResumeSessionOptions {
    pub source: String,
    pub active_header: String,
    pub compile: CompileOptions,
}

pub fn compile_source(source: &str, options: &CompileOptions) -> Result<DialogueTree, QdlError> {
    compile(source, options)
}

pub fn open_session(source: &str, options: &CompileOptions) -> Result<DialogueSession, QdlError> {
    Ok(DialogueSession::new(compile(source, options)?))
}

pub fn open_session_from_path(
    path: &Path,
    options: &CompileOptions,
) -> Result<DialogueSession, QdlError> {
    let source = read_source(path)?;
    debug!("loaded dialogue source {}", path.display());
    open_session(&source, options)
}

/// Recompiles the source and moves to a previously saved header.
pub fn resume_session(options: ResumeSessionOptions) -> Result<DialogueSession, QdlError> {
    let mut session = open_session(&options.source, &options.compile)?;
    session.restore_active_header(&options.active_header)?;
    Ok(session)
}

pub fn read_source(path: &Path) -> Result<String, QdlError> {
    fs::read_to_string(path).map_err(|error| {
        QdlError::new(
            "API_SOURCE_READ",
            format!("Failed to read dialogue \"{}\": {}", path.display(), error),
        )
    })
}
