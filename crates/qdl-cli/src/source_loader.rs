use std::fs;
use std::path::{Path, PathBuf};

use qdl_core::QdlError;
use walkdir::WalkDir;

use crate::{map_cli_source_path, map_cli_source_read, map_cli_source_scan, LoadedDialogue};

pub(crate) const DIALOGUE_EXTENSION: &str = "qdl";

pub(crate) fn load_dialogue(source: &str) -> Result<LoadedDialogue, QdlError> {
    let path = resolve_source_path(source)?;
    if !path.is_file() {
        return Err(QdlError::new(
            "CLI_SOURCE_NOT_FILE",
            format!("source is not a file: {}", path.display()),
        ));
    }
    read_dialogue(&path)
}

pub(crate) fn read_dialogue(path: &Path) -> Result<LoadedDialogue, QdlError> {
    let source = fs::read_to_string(path).map_err(map_cli_source_read)?;
    Ok(LoadedDialogue {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn resolve_source_path(source: &str) -> Result<PathBuf, QdlError> {
    let path = PathBuf::from(source);
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(map_cli_source_path)?
            .join(path)
    };

    if !absolute.exists() {
        return Err(QdlError::new(
            "CLI_SOURCE_NOT_FOUND",
            format!("source does not exist: {}", absolute.display()),
        ));
    }

    Ok(absolute)
}

/// Every `.qdl` file under `root` in path order, or `root` itself when it is a file.
pub(crate) fn collect_dialogue_files(root: &Path) -> Result<Vec<PathBuf>, QdlError> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(map_cli_source_scan)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_dialogue = entry
            .path()
            .extension()
            .is_some_and(|extension| extension == DIALOGUE_EXTENSION);
        if is_dialogue {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        return Err(QdlError::new(
            "CLI_SOURCE_EMPTY",
            format!("No .qdl files under {}", root.display()),
        ));
    }

    Ok(files)
}

#[cfg(test)]
mod source_loader_tests {
    use super::*;
    use crate::cli_test_support::*;

    #[test]
    fn resolve_source_path_validates_existence_and_relative_paths() {
        let missing = temp_path("missing.qdl");
        let error = resolve_source_path(missing.to_string_lossy().as_ref())
            .expect_err("missing path should fail");
        assert_eq!(error.code, "CLI_SOURCE_NOT_FOUND");

        let demos = demo_dir();
        let resolved = resolve_source_path(demos.to_string_lossy().as_ref()).expect("demos");
        assert!(resolved.is_absolute());
    }

    #[test]
    fn load_dialogue_requires_a_file() {
        let root = temp_path("not-a-file");
        fs::create_dir_all(&root).expect("root");
        let error = load_dialogue(root.to_string_lossy().as_ref()).expect_err("dir is not a file");
        assert_eq!(error.code, "CLI_SOURCE_NOT_FILE");

        let file = root.join("hello.qdl");
        write_file(&file, GREETING);
        let loaded = load_dialogue(file.to_string_lossy().as_ref()).expect("file loads");
        assert_eq!(loaded.source, GREETING);
        assert_eq!(loaded.path, file);
    }

    #[test]
    fn collect_dialogue_files_filters_extension_and_sorts() {
        let root = temp_path("dialogue-dir");
        write_file(&root.join("b.qdl"), GREETING);
        write_file(&root.join("nested").join("a.qdl"), GREETING);
        write_file(&root.join("notes.txt"), "ignored");

        let files = collect_dialogue_files(&root).expect("scan should pass");
        let names = files
            .iter()
            .map(|path| {
                path.strip_prefix(&root)
                    .expect("under root")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["b.qdl", "nested/a.qdl"]);
    }

    #[test]
    fn collect_dialogue_files_accepts_single_file_and_rejects_empty_dir() {
        let root = temp_path("single-file-dir");
        let file = root.join("only.qdl");
        write_file(&file, GREETING);
        assert_eq!(collect_dialogue_files(&file).expect("file"), vec![file.clone()]);

        let empty = temp_path("empty-dialogue-dir");
        write_file(&empty.join("readme.txt"), "not a dialogue");
        let error = collect_dialogue_files(&empty).expect_err("no dialogues");
        assert_eq!(error.code, "CLI_SOURCE_EMPTY");
    }
}
