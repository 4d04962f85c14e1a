use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "qdl-player")]
#[command(about = "Quasi-Dialogue Language player and checker")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Agent(AgentArgs),
    Tui(TuiArgs),
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub(crate) struct AgentArgs {
    #[command(subcommand)]
    pub(crate) command: AgentCommand,
}

#[derive(Debug, Subcommand)]
pub(crate) enum AgentCommand {
    Start(StartArgs),
    Choose(ChooseArgs),
}

/// Compiler switches shared by every mode that reads a dialogue.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct CompileArgs {
    /// Command name the host handles; repeat for several.
    #[arg(long = "host-command")]
    pub(crate) host_commands: Vec<String>,
    /// Reject duplicate headers and gotos to unknown branches.
    #[arg(long = "strict")]
    pub(crate) strict: bool,
}

#[derive(Debug, Args)]
pub(crate) struct StartArgs {
    #[arg(long = "source")]
    pub(crate) source: String,
    #[command(flatten)]
    pub(crate) compile: CompileArgs,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Args)]
pub(crate) struct ChooseArgs {
    #[arg(long = "state-in")]
    pub(crate) state_in: String,
    #[arg(long = "choice")]
    pub(crate) choice: usize,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Args)]
pub(crate) struct TuiArgs {
    #[arg(long = "source")]
    pub(crate) source: String,
    #[command(flatten)]
    pub(crate) compile: CompileArgs,
    #[arg(long = "state-file")]
    pub(crate) state_file: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    /// A .qdl file or a directory scanned for .qdl files.
    #[arg(long = "source")]
    pub(crate) source: String,
    #[command(flatten)]
    pub(crate) compile: CompileArgs,
    #[arg(long = "json")]
    pub(crate) json: bool,
}
