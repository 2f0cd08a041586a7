use clap::Parser;
use clap_repl::ClapEditor;
use clap_repl::reedline::{
    DefaultPrompt, FileBackedHistory, Highlighter, Prompt, PromptEditMode, PromptHistorySearch,
    StyledText,
};
use dsosyms::commands::{self, Session};
use dsosyms::elf::ElfFile;
use dsosyms::repl::{ElfAction, MainCommand, Repl};
use dsosyms::utils::{self, warn};
use nu_ansi_term::{Color, Style};
use std::borrow::Cow;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(infer_subcommands(true))]
struct Cli {
    /// Path to an executable or shared object
    image: PathBuf,

    /// Report nothing if an image has more than this many functions or probes
    #[arg(long)]
    max_symbols: Option<usize>,

    /// Run one command and exit instead of starting the REPL
    #[command(subcommand)]
    command: Option<MainCommand>,
}

/// Colors whatever the user types.
pub struct MyHighlighter {
    color: Color,
}

impl Highlighter for MyHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled_text = StyledText::new();
        styled_text.push((Style::new().fg(self.color), line.to_string()));
        styled_text
    }
}

impl MyHighlighter {
    pub fn new() -> MyHighlighter {
        MyHighlighter { color: Color::Blue }
    }
}

impl Default for MyHighlighter {
    fn default() -> Self {
        MyHighlighter::new()
    }
}

pub struct MyPrompt {
    color: clap_repl::reedline::Color,
    default: DefaultPrompt,
}

impl Prompt for MyPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed("dsosyms")
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("> ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        self.default.render_prompt_multiline_indicator()
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        self.default
            .render_prompt_history_search_indicator(history_search)
    }

    // the text that appears in the prompt
    fn get_prompt_color(&self) -> clap_repl::reedline::Color {
        self.color
    }
}

impl MyPrompt {
    fn new() -> MyPrompt {
        MyPrompt {
            color: clap_repl::reedline::Color::DarkBlue,
            default: DefaultPrompt::default(),
        }
    }
}

fn dispatch(session: &Session, command: MainCommand) {
    let out = std::io::stdout().lock();
    use MainCommand::*;
    match command {
        Elf(elf) => match elf.action {
            ElfAction::Header(args) => commands::elf_header(session, &args, out),
            ElfAction::Notes(args) => commands::elf_notes(session, &args, out),
            ElfAction::Sections(args) => commands::elf_sections(session, &args, out),
            ElfAction::Segments(args) => commands::elf_segments(session, &args, out),
        },
        Probes(args) => commands::probes(session, &args, out),
        Resolve(args) => commands::resolve(session, &args, out),
        Symbols(args) => commands::symbols(session, &args, out),
        Quit => process::exit(0),
    }
}

fn main() {
    utils::generate_style_file();

    let cli = Cli::parse();
    if let Err(err) = ElfFile::new(cli.image.clone()) {
        warn(&format!("Couldn't load {}: {err}", cli.image.display()));
        process::exit(1);
    }
    let session = Session::new(cli.image, cli.max_symbols);

    if let Some(command) = cli.command {
        dispatch(&session, command);
        return;
    }

    // left prompt                    before what the user types
    // highlighter                    this is for what the user types
    let history = utils::config_dir().map(|dir| dir.join("history"));
    let rl = ClapEditor::<Repl>::builder()
        .with_prompt(Box::new(MyPrompt::new()))
        .with_editor_hook(move |reed| {
            let reed = reed.with_highlighter(Box::new(MyHighlighter::new()));
            let Some(path) = history.clone() else {
                return reed;
            };
            match FileBackedHistory::with_file(10000, path) {
                Ok(history) => reed.with_history(Box::new(history)),
                Err(err) => {
                    warn(&format!("couldn't open history: {err}"));
                    reed
                }
            }
        })
        .build();

    rl.repl(|repl: Repl| dispatch(&session, repl.command));
}
