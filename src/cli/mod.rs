// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. clap parses the
// arguments; all work is delegated to Layer 2 (application).
//
// Four commands, one per pipeline invocation:
//   1. `clean` — strip line numbers from input.txt
//   2. `fetch` — download + merge the corpus archive
//   3. `train` — train and export the next-word model
//   4. `query` — interactive predictions from an export
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use std::io;
use std::path::Path;

use commands::{CleanArgs, Commands, FetchArgs, QueryArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "next-word-lstm",
    version,
    about = "Prepare a text corpus, train a word-level LSTM next-word model, export and query it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Clean(args) => run_clean(args),
            Commands::Fetch(args) => run_fetch(args),
            Commands::Train(args) => run_train(args),
            Commands::Query(args) => run_query(args),
        }
    }
}

fn run_clean(args: CleanArgs) -> Result<()> {
    use crate::application::clean_use_case::CleanUseCase;

    let output = args.output.clone();
    let lines  = CleanUseCase::new(args.into()).execute()?;
    println!("Cleaned text saved to '{}' ({} lines).", output, lines);
    Ok(())
}

fn run_fetch(args: FetchArgs) -> Result<()> {
    use crate::application::fetch_use_case::{FetchOutcome, FetchUseCase};
    use crate::infra::http_source::HttpArchiveSource;

    let report = FetchUseCase::new(args.into(), HttpArchiveSource::new()?).execute()?;
    match report.outcome {
        FetchOutcome::AlreadyPresent         => println!("Corpus already present, download skipped."),
        FetchOutcome::Extracted { entries }  => println!("Corpus downloaded and extracted ({entries} files)."),
    }
    println!(
        "Merged {} files into '{}'.",
        report.file_count,
        report.output.display()
    );
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::{
        query_use_case::QueryContext,
        train_use_case::TrainUseCase,
    };
    use crate::ml::inferencer::Inferencer;

    tracing::info!("Starting training on corpus: {}", args.corpus);

    let outcome = TrainUseCase::new((&args).into()).execute()?;
    println!("Export saved to '{}'.", outcome.export_dir.display());

    if !args.no_interactive {
        let ctx = QueryContext::new(
            outcome.vocabulary,
            outcome.window_length,
            Inferencer::new(outcome.model, outcome.device),
            args.query.into(),
        )?;
        ctx.run(io::stdin().lock(), io::stdout().lock())?;
    }
    Ok(())
}

fn run_query(args: QueryArgs) -> Result<()> {
    use crate::application::query_use_case::load_query_context;

    let ctx = load_query_context(Path::new(&args.export_dir), args.settings.into())?;
    ctx.run(io::stdin().lock(), io::stdout().lock())?;
    Ok(())
}
