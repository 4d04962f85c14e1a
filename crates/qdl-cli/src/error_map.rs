use std::fmt::Display;

use qdl_core::QdlError;

fn map_error(code: &'static str, error: impl Display) -> QdlError {
    QdlError::new(code, error.to_string())
}

pub(crate) fn json_string(value: &str) -> String {
    serde_json::to_string(value).expect("string json")
}

pub(crate) fn emit_error(error: QdlError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!("ERROR_MSG_JSON:{}", json_string(&error.message));
    if let Some(index) = error.index {
        println!("ERROR_INDEX:{}", index);
    }
    if let Some(location) = error.location {
        println!("ERROR_AT:{}:{}", location.line, location.column);
    }
    1
}

pub(crate) fn map_tui_io(error: std::io::Error) -> QdlError {
    map_error("TUI_IO", error)
}

pub(crate) fn map_cli_source_path(error: std::io::Error) -> QdlError {
    map_error("CLI_SOURCE_PATH", error)
}

pub(crate) fn map_cli_source_scan(error: walkdir::Error) -> QdlError {
    map_error("CLI_SOURCE_SCAN", error)
}

pub(crate) fn map_cli_source_read(error: std::io::Error) -> QdlError {
    map_error("CLI_SOURCE_READ", error)
}

pub(crate) fn map_cli_state_write(error: std::io::Error) -> QdlError {
    map_error("CLI_STATE_WRITE", error)
}

pub(crate) fn map_cli_state_encode(error: serde_json::Error) -> QdlError {
    map_error("CLI_STATE_WRITE", error)
}

pub(crate) fn map_cli_state_read(error: std::io::Error) -> QdlError {
    map_error("CLI_STATE_READ", error)
}

pub(crate) fn map_cli_state_invalid(error: serde_json::Error) -> QdlError {
    map_error("CLI_STATE_INVALID", error)
}
