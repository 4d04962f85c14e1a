use log::warn;
use qdl_api::compile_source;
use qdl_core::{DialogueTree, QdlError};

use crate::{
    collect_dialogue_files, compile_options, json_string, read_dialogue, resolve_source_path,
    CheckArgs,
};

/// Compiles every dialogue under `--source` and reports each one. Exits
/// non-zero when any of them fails.
pub(super) fn run_check(args: CheckArgs) -> Result<i32, QdlError> {
    let root = resolve_source_path(&args.source)?;
    let options = compile_options(&args.compile);
    let files = collect_dialogue_files(&root)?;

    let mut lines = Vec::with_capacity(files.len());
    let mut failures = 0usize;
    for path in files {
        let dialogue = read_dialogue(&path)?;
        let display = path.to_string_lossy().to_string();
        match compile_source(&dialogue.source, &options) {
            Ok(tree) if args.json => {
                let tree_json = serde_json::to_string(&tree).map_err(|error| {
                    QdlError::new("CLI_TREE_ENCODE", error.to_string())
                })?;
                lines.push(format!("TREE_JSON:{}|{}", display, tree_json));
            }
            Ok(tree) => lines.push(summary_line(&display, &tree)),
            Err(error) => {
                warn!("{}: {}", display, error);
                failures += 1;
                let at = error
                    .location
                    .map(|location| format!("{}:{}", location.line, location.column))
                    .unwrap_or_else(|| "-".to_string());
                lines.push(format!(
                    "CHECK_ERROR:{}|{}|{}|{}",
                    display,
                    error.code,
                    at,
                    json_string(&error.message)
                ));
            }
        }
    }

    let checked = lines.len();
    println!("{}", if failures == 0 { "RESULT:OK" } else { "RESULT:ERROR" });
    for line in lines {
        println!("{}", line);
    }
    println!("CHECKED:{}|FAILED:{}", checked, failures);
    Ok(if failures == 0 { 0 } else { 1 })
}

fn summary_line(display: &str, tree: &DialogueTree) -> String {
    let objects = tree
        .branches()
        .iter()
        .map(|branch| branch.objects().len())
        .sum::<usize>();
    format!(
        "CHECK_OK:{}|{}|branches={}|responses={}",
        display,
        json_string(tree.title()),
        tree.branches().len(),
        objects
    )
}
