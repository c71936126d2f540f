use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// code-change-corpus - compile git changes and project files into a searchable corpus
#[derive(Parser, Debug)]
#[command(name = "code-change-corpus", version, about, long_about = None)]
pub struct Args {
    /// Configuration file (defaults to ./code-change-corpus.toml when present)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Cache directory
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub cache_path: Option<PathBuf>,

    /// Cache file name inside the cache directory
    #[arg(long, global = true)]
    pub cache_file: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rebuild the corpus cache from commit changes and the project tree
    Compile {
        /// Repository to extract commits from (defaults to the project root)
        #[arg(long, value_hint = ValueHint::DirPath, conflicts_with = "commits_json")]
        repo: Option<PathBuf>,

        /// Read change records from a JSON file instead of a repository
        #[arg(long, value_hint = ValueHint::FilePath)]
        commits_json: Option<PathBuf>,

        /// Maximum number of commits to extract
        #[arg(long)]
        max_commits: Option<usize>,

        /// Local branch to extract from (defaults to HEAD)
        #[arg(long)]
        branch: Option<String>,

        /// Directory whose files are appended to the corpus
        #[arg(long, value_hint = ValueHint::DirPath)]
        project_root: Option<PathBuf>,

        /// Ignore-rules file name relative to the project root
        #[arg(long, conflicts_with = "no_ignore")]
        ignore_file: Option<String>,

        /// Include every text file regardless of ignore rules
        #[arg(long)]
        no_ignore: bool,
    },

    /// Index the cached corpus and print the chunks most relevant to a query
    Search {
        query: String,

        /// Number of chunks to return
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Delete the cache directory and everything in it
    Clean,
}
