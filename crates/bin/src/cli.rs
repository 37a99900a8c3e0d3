//! CLI argument definitions for the datasets binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Resolve hierarchical test-data templates
#[derive(Parser, Debug)]
#[command(name = "datasets")]
#[command(about = "Datasets: resolve macros and overrides in test-data templates")]
#[command(version)]
pub struct Cli {
    /// Print machine-readable JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the macro tokens of a text
    Tokens(TokensArgs),
    /// Evaluate text in the scope of a DataSet
    Eval(EvalArgs),
    /// Print the resolved tree of a DataSetList
    Tree(TreeArgs),
    /// Resolve a dotted `dsl.ds.attr` reference
    Resolve(ResolveArgs),
}

/// Options shared by every command that reads a store.
#[derive(clap::Args, Debug, Clone)]
pub struct StoreArgs {
    /// JSON store file
    #[arg(short, long, default_value = "datasets.json", env = "DATASETS_STORE")]
    pub store: PathBuf,

    /// Default pattern for #DATE
    #[arg(long, env = "DATASETS_DATE_FORMAT")]
    pub date_format: Option<String>,

    /// Seed for RANDOM and UUID macros
    #[arg(long)]
    pub seed: Option<u64>,

    /// Render failed macros as empty text instead of `[message]`
    #[arg(long)]
    pub quiet_errors: bool,
}

/// Arguments for the tokens command
#[derive(clap::Args, Debug)]
pub struct TokensArgs {
    /// Text to tokenize
    pub text: String,
}

/// Arguments for the eval command
#[derive(clap::Args, Debug)]
pub struct EvalArgs {
    #[command(flatten)]
    pub store_config: StoreArgs,

    /// DataSetList owning the DataSet (name or id)
    #[arg(long)]
    pub dsl: String,

    /// DataSet whose scope the text is evaluated in (name or id)
    #[arg(long)]
    pub dataset: String,

    /// Text to evaluate
    pub text: String,
}

/// Arguments for the tree command
#[derive(clap::Args, Debug)]
pub struct TreeArgs {
    #[command(flatten)]
    pub store_config: StoreArgs,

    /// DataSetList to resolve (name or id)
    pub dsl: String,
}

/// Arguments for the resolve command
#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub store_config: StoreArgs,

    /// Reference such as `Customers.Alice.Address.City`
    pub reference: String,
}
