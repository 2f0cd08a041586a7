//! Definitions for the commands that are used interactively (or passed on the command
//! line), e.g. `probes -t` and `elf sections`.
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(infer_subcommands(true))] // allow abreviations
pub struct Repl {
    #[command(subcommand)]
    pub command: MainCommand,
}

#[derive(Subcommand)]
pub enum MainCommand {
    /// Show low level information about the image
    Elf(ElfCommand),

    /// List SDT probes from .note.stapsdt
    Probes(ListArgs),

    /// Print the addresses of a function or probe
    Resolve(ResolveArgs),

    /// List functions with addresses relative to the load bias
    Symbols(ListArgs),

    /// Exit dsosyms
    Quit,
}

#[derive(Args)]
pub struct ElfCommand {
    #[clap(subcommand)]
    pub action: ElfAction,
}

#[derive(Subcommand)]
pub enum ElfAction {
    /// Show ELF header
    Header(ExplainArgs),

    /// Show decoded stapsdt notes
    Notes(TableArgs),

    /// Show sections
    Sections(TableArgs),

    /// Show segments
    Segments(TableArgs),
}

#[derive(Args)]
pub struct ExplainArgs {
    /// Explain columns, fields, etc.
    #[arg(short, long)]
    pub explain: bool,
}

#[derive(Args)]
pub struct TableArgs {
    /// Explain columns, fields, etc.
    #[arg(short, long)]
    pub explain: bool,

    /// Add column headers
    #[arg(short, long)]
    pub titles: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Explain columns, fields, etc.
    #[arg(short, long)]
    pub explain: bool,

    /// Add column headers
    #[arg(short, long)]
    pub titles: bool,

    /// Max number of results to report, 0 for unlimited
    #[arg(short, long, default_value_t = 0)]
    pub max_results: usize,

    /// Only report names containing this string
    #[arg(long)]
    pub filter: Option<String>,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Function or probe name, must match exactly
    pub name: String,

    /// Look in the SDT probes instead of the functions
    #[arg(long)]
    pub probe: bool,
}
