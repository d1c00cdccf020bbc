use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};

use deck::render::bevy::run_viewer;
use deck::render::{pdf, resolve_deck, FrameSelection, PresenterView, ResolveConfig};
use deck::{parse_deck, talk, Config, Deck, Error, Result, Slide};

/// Present "Using Rust for Android Development"
#[derive(Parser, Debug)]
#[command(name = "rust-android-talk", version, about)]
struct Cli {
    /// Deck source file; the built-in talk is used when omitted
    #[arg(long, value_name = "FILE")]
    deck: Option<PathBuf>,

    /// TOML config file (defaults to ./deck.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the slide viewer window
    View,
    /// Render the deck to a PDF file
    ExportPdf {
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
        /// One page per reveal step instead of one per slide
        #[arg(long)]
        fragments: bool,
    },
    /// Print speaker notes for every slide
    Notes,
    /// Print the slide tree
    Outline,
    /// Parse the deck and report what it contains
    Check,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let deck = load_deck(cli.deck.as_deref())?;

    match cli.command.unwrap_or(Command::View) {
        Command::View => {
            let config = Config::discover(cli.config.as_deref())?;
            run_viewer(deck, &config)
        }
        Command::ExportPdf { output, fragments } => {
            let config = Config::discover(cli.config.as_deref())?;
            let selection = if fragments {
                FrameSelection::EachStep
            } else {
                FrameSelection::FullyRevealed
            };
            let resolved = resolve_deck(&deck, &ResolveConfig::from_config(&config)?, selection);
            pdf::export_to_pdf(&resolved, &config.window.title, &output)
        }
        Command::Notes => {
            for view in PresenterView::all(&deck) {
                println!("{}", view);
            }
            Ok(())
        }
        Command::Outline => {
            print!("{}", outline(&deck));
            Ok(())
        }
        Command::Check => {
            let leaves = deck.leaves().count();
            let fragments: usize = deck.leaves().map(|(_, _, leaf)| leaf.fragment_count()).sum();
            println!(
                "ok: {} top-level slides, {} leaf slides, {} fragments",
                deck.slides().len(),
                leaves,
                fragments
            );
            Ok(())
        }
    }
}

fn load_deck(path: Option<&Path>) -> Result<Deck> {
    match path {
        Some(path) => {
            info!("Loading deck from {}", path.display());
            let source = fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
            parse_deck(&source)
        }
        None => talk::deck(),
    }
}

fn outline(deck: &Deck) -> String {
    let mut out = String::new();
    for (h, slide) in deck.slides().iter().enumerate() {
        match slide {
            Slide::Leaf(leaf) => {
                out.push_str(&format!("{}. {}", h + 1, leaf.title().unwrap_or("(untitled)")));
                push_fragments(&mut out, leaf.fragment_count());
            }
            Slide::Group(group) => {
                out.push_str(&format!("{}. [{} sub-slides]\n", h + 1, group.slides.len()));
                for (v, leaf) in group.slides.iter().enumerate() {
                    out.push_str(&format!(
                        "   {}.{} {}",
                        h + 1,
                        v + 1,
                        leaf.title().unwrap_or("(untitled)")
                    ));
                    push_fragments(&mut out, leaf.fragment_count());
                }
            }
        }
    }
    out
}

fn push_fragments(out: &mut String, count: usize) {
    if count > 0 {
        out.push_str(&format!(" ({} fragments)", count));
    }
    out.push('\n');
}
