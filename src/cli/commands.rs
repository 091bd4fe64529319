// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and their flags. Every default
// is the fixed file name or constant the pipeline has always
// used, so a bare `next-word-lstm train` behaves like the
// plain script did.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{
    clean_use_case::CleanConfig,
    fetch_use_case::{FetchConfig, DEFAULT_CORPUS_URL},
    query_use_case::QuerySettings,
    train_use_case::TrainConfig,
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Strip leading line numbers from a text file
    Clean(CleanArgs),

    /// Download the corpus archive and merge it into one training file
    Fetch(FetchArgs),

    /// Train the next-word model and export it
    Train(TrainArgs),

    /// Query an exported model interactively
    Query(QueryArgs),
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    #[arg(long, default_value = "input.txt")]
    pub input: String,

    /// Overwritten unconditionally
    #[arg(long, default_value = "cleaned.txt")]
    pub output: String,
}

impl From<CleanArgs> for CleanConfig {
    fn from(a: CleanArgs) -> Self {
        CleanConfig { input: a.input, output: a.output }
    }
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// ZIP archive to download
    #[arg(long, default_value = DEFAULT_CORPUS_URL)]
    pub url: String,

    /// Directory the archive unpacks to; if it exists nothing is downloaded
    #[arg(long, default_value = "CodEAlltag_pXL_GERMAN-master")]
    pub target_dir: String,

    /// Where the archive is extracted
    #[arg(long, default_value = ".")]
    pub extract_to: String,

    /// File extension (without dot) of the corpus files to merge
    #[arg(long, default_value = "txt")]
    pub extension: String,

    /// Merged, normalized training text
    #[arg(long, default_value = "training_data_alltag.txt")]
    pub output: String,
}

impl From<FetchArgs> for FetchConfig {
    fn from(a: FetchArgs) -> Self {
        FetchConfig {
            url:        a.url,
            target_dir: a.target_dir,
            extract_to: a.extract_to,
            extension:  a.extension,
            output:     a.output,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Training text file, or a directory of text files
    #[arg(long, default_value = "cleaned.txt")]
    pub corpus: String,

    /// Directory receiving vocab, config, weights and the web model
    #[arg(long, default_value = "export")]
    pub output_dir: String,

    /// Extension of corpus files when --corpus is a directory
    #[arg(long, default_value = "txt")]
    pub extension: String,

    /// Context tokens per prediction. Queries must use the same value.
    #[arg(long, default_value_t = 20)]
    pub window_length: usize,

    /// Most frequent tokens kept; the rest map to <OOV>
    #[arg(long, default_value_t = 10_000)]
    pub max_vocab: usize,

    #[arg(long, default_value_t = 128)]
    pub embedding_dim: usize,

    /// Width of both LSTM layers
    #[arg(long, default_value_t = 256)]
    pub hidden_dim: usize,

    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Seed for weight init and shuffling; random if omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Exit after exporting instead of starting the query loop
    #[arg(long)]
    pub no_interactive: bool,

    #[command(flatten)]
    pub query: QuerySettingsArgs,
}

impl From<&TrainArgs> for TrainConfig {
    fn from(a: &TrainArgs) -> Self {
        TrainConfig {
            corpus:        a.corpus.clone(),
            output_dir:    a.output_dir.clone(),
            extension:     a.extension.clone(),
            window_length: a.window_length,
            max_vocab:     a.max_vocab,
            embedding_dim: a.embedding_dim,
            hidden_dim:    a.hidden_dim,
            epochs:        a.epochs,
            batch_size:    a.batch_size,
            lr:            a.lr,
            seed:          a.seed,
        }
    }
}

#[derive(Args, Debug, Clone, Copy)]
pub struct QuerySettingsArgs {
    /// Number of ranked next words printed per query
    #[arg(long, default_value_t = 5)]
    pub top_k: usize,

    /// Maximum words added by the greedy continuation
    #[arg(long, default_value_t = 20)]
    pub continuation: usize,
}

impl From<QuerySettingsArgs> for QuerySettings {
    fn from(a: QuerySettingsArgs) -> Self {
        QuerySettings { top_k: a.top_k, continuation: a.continuation }
    }
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Directory written by `train`
    #[arg(long, default_value = "export")]
    pub export_dir: String,

    #[command(flatten)]
    pub settings: QuerySettingsArgs,
}
