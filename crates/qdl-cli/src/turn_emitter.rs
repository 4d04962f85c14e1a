use qdl_core::{ExternalCommand, QdlError};
use qdl_runtime::DialogueSession;

use crate::{json_string, TurnEvent, TurnResult};

pub(crate) fn describe_turn(
    session: &DialogueSession,
    external: Option<ExternalCommand>,
) -> Result<TurnResult, QdlError> {
    let title = session.tree().title().to_string();
    if session.is_finished() {
        return Ok(TurnResult {
            event: TurnEvent::End,
            title,
            header: None,
            message: None,
            choices: Vec::new(),
            external,
        });
    }

    let branch = session.active_branch()?;
    Ok(TurnResult {
        event: TurnEvent::Branch,
        title,
        header: Some(branch.header().to_string()),
        message: Some(branch.message().to_string()),
        choices: branch
            .objects()
            .iter()
            .map(|object| object.response().to_string())
            .collect(),
        external,
    })
}

pub(crate) fn emit_turn(turn: TurnResult, state_out: Option<String>) {
    println!("RESULT:OK");
    match turn.event {
        TurnEvent::Branch => println!("EVENT:BRANCH"),
        TurnEvent::End => println!("EVENT:END"),
    }
    println!("TITLE_JSON:{}", json_string(&turn.title));

    if let Some(external) = turn.external {
        println!(
            "EXTERNAL:{}|{}",
            external.command.name(),
            json_string(&external.argument)
        );
    }

    if let Some(header) = turn.header {
        println!("HEADER_JSON:{}", json_string(&header));
    }

    if let Some(message) = turn.message {
        println!("MESSAGE_JSON:{}", json_string(&message));
    }

    for (index, text) in turn.choices.iter().enumerate() {
        println!("CHOICE:{}|{}", index, json_string(text));
    }

    println!(
        "STATE_OUT:{}",
        state_out.unwrap_or_else(|| "NONE".to_string())
    );
}
