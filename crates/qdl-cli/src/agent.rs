use std::path::Path;

use qdl_core::QdlError;

use crate::{
    compile_options, emit_session, load_dialogue, load_session_from_state,
    open_session_for_dialogue, AgentArgs, AgentCommand, ChooseArgs, StartArgs,
};

pub(super) fn run_agent(args: AgentArgs) -> Result<i32, QdlError> {
    match args.command {
        AgentCommand::Start(args) => run_start(args),
        AgentCommand::Choose(args) => run_choose(args),
    }
}

pub(super) fn run_start(args: StartArgs) -> Result<i32, QdlError> {
    let dialogue = load_dialogue(&args.source)?;
    let options = compile_options(&args.compile);
    let session = open_session_for_dialogue(&dialogue, &options)?;
    emit_session(&session, None, &args.state_out, &dialogue, &options)
}

pub(super) fn run_choose(args: ChooseArgs) -> Result<i32, QdlError> {
    let (dialogue, options, mut session) = load_session_from_state(Path::new(&args.state_in))?;
    let external = session.apply_choice(args.choice)?;
    emit_session(&session, external, &args.state_out, &dialogue, &options)
}
