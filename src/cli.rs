use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Review context tooling: numbered diff context and repository grep.
#[derive(Debug, Parser)]
#[command(name = "review-context", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rebuild post-change line numbers from a unified diff
    Diff(DiffArgs),
    /// Search repository files and print matches with context
    Grep(GrepArgs),
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Diff file to read, or `-` for stdin
    pub input: PathBuf,

    /// Only render this file (accepts `a/`/`b/` prefixed paths)
    #[arg(long)]
    pub file: Option<String>,

    /// Render added and modified lines only
    #[arg(long, conflicts_with = "around")]
    pub changed_only: bool,

    /// Render changed lines plus N lines around them
    #[arg(long, value_name = "N")]
    pub around: Option<u32>,

    /// Print the per-file contexts as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct GrepArgs {
    /// Text or regular expression to search for
    pub pattern: String,

    /// Repository root (defaults to REPO_ROOT, then the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Treat the pattern as a regular expression
    #[arg(long)]
    pub regex: bool,

    /// Case-insensitive matching
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Glob of files to include (repeatable, default `*`)
    #[arg(long = "include", value_name = "GLOB")]
    pub include: Vec<String>,

    /// Glob of files to exclude (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Lines of context before and after each match
    #[arg(short = 'C', long = "context", default_value_t = 10)]
    pub context: usize,

    /// Stop after this many matches
    #[arg(long, default_value_t = 50)]
    pub max_results: usize,

    /// Print the structured tool output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grep_defaults() {
        let cli = Cli::try_parse_from(["review-context", "grep", "TODO"]).unwrap();
        let Commands::Grep(args) = cli.command else {
            panic!("expected grep");
        };
        assert_eq!(args.context, 10);
        assert_eq!(args.max_results, 50);
        assert!(args.include.is_empty());
        assert!(!args.ignore_case);
    }

    #[test]
    fn changed_only_conflicts_with_around() {
        let res = Cli::try_parse_from([
            "review-context",
            "diff",
            "-",
            "--changed-only",
            "--around",
            "2",
        ]);
        assert!(res.is_err());
    }
}
