use std::collections::HashSet;

use qdl_core::{DialogueCommand, DialogueTree, QdlError};

/// Optional strict pass: every header is unique and every `goto` lands on a branch.
pub fn validate_references(tree: &DialogueTree) -> Result<(), QdlError> {
    let mut seen = HashSet::with_capacity(tree.branches().len());
    for branch in tree.branches() {
        if !seen.insert(branch.header()) {
            return Err(QdlError::new(
                "QDL_REF_DUPLICATE_HEADER",
                format!("Header \"{}\" is used by more than one branch.", branch.header()),
            ));
        }
    }

    for branch in tree.branches() {
        for object in branch.objects() {
            for (command, arg) in object.command_pairs() {
                if *command == DialogueCommand::Goto && !seen.contains(arg) {
                    return Err(QdlError::new(
                        "QDL_REF_DANGLING_GOTO",
                        format!(
                            "Response \"{}\" in branch \"{}\" goes to unknown header \"{}\".",
                            object.response(),
                            branch.header(),
                            arg
                        ),
                    ));
                }
            }
        }
    }
    Ok(())
}
