use log::{debug, trace, warn};
use qdl_core::{DialogueCommand, DialogueTree, ExternalCommand, QdlError, EXIT_HEADER};

/// Runs the commands attached to `object_index` of the active branch.
///
/// `goto` and `exit` move the tree's active header. Any other command lands in
/// the returned slot; the slot starts empty every call and holds at most one
/// command, so a later host command in the same object replaces an earlier one.
pub fn apply_choice(
    tree: &mut DialogueTree,
    object_index: usize,
) -> Result<Option<ExternalCommand>, QdlError> {
    let mut external: Option<ExternalCommand> = None;

    if tree.is_exited() {
        return Err(QdlError::new(
            "QDL_RUNTIME_DIALOGUE_ENDED",
            format!("Dialogue \"{}\" has already ended.", tree.title()),
        ));
    }

    let branch = tree.active_branch()?;
    let object = branch
        .object(object_index)
        .ok_or_else(|| {
            QdlError::new(
                "QDL_RUNTIME_OBJECT_INDEX",
                format!(
                    "Choice {} is out of range for branch \"{}\" ({} responses).",
                    object_index,
                    branch.header(),
                    branch.objects().len()
                ),
            )
        })?
        .clone();

    for (command, arg) in object.command_pairs() {
        trace!("apply {} \"{}\"", command.name(), arg);
        match command {
            DialogueCommand::Goto => {
                debug!("goto \"{}\" from \"{}\"", arg, tree.active_header());
                tree.set_active_header(arg);
            }
            DialogueCommand::Exit => {
                debug!("exit from \"{}\"", tree.active_header());
                tree.set_active_header(EXIT_HEADER);
            }
            DialogueCommand::Become | DialogueCommand::Host(_) => {
                let replaced = external.replace(ExternalCommand {
                    command: command.clone(),
                    argument: arg.to_string(),
                });
                if let Some(replaced) = replaced {
                    warn!(
                        "external command {} \"{}\" replaced by {} in the same choice",
                        replaced.command.name(),
                        replaced.argument,
                        command.name()
                    );
                }
            }
        }
    }

    Ok(external)
}
