use clap::{Args, Parser, Subcommand};
use photoreel::source::TagMode;
use photoreel_common::{DetailLevel, FailurePolicy, SafetyLevel};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photoreel")]
#[command(author, version, about = "Paginated photo album import tool")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import every photo of an album
    Import {
        /// Album id or album URL (https://www.flickr.com/photos/<owner>/albums/<id>)
        reference: String,

        /// Album owner, required when REFERENCE is a bare id
        #[arg(long)]
        owner: Option<String>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Walk the results of a photo search
    Search {
        /// Full-text query
        #[arg(long)]
        text: Option<String>,

        /// Comma-separated tags to match
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Whether photos must carry any or all of the tags
        #[arg(long, default_value = "any")]
        tag_mode: TagMode,

        /// Restrict results to one owner
        #[arg(long)]
        user: Option<String>,

        /// Content filter: safe, moderate or restricted
        #[arg(long)]
        safe_search: Option<SafetyLevel>,

        /// Sort order understood by the source (e.g. date-posted-desc)
        #[arg(long)]
        sort: Option<String>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Remove every cached response
    ClearCache,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

/// Flags shared by `import` and `search`. Each overrides the `[run]` config section.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Photos per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Detail level: basic, detailed or full
    #[arg(long)]
    pub detail: Option<DetailLevel>,

    /// Stop after this many processed photos
    #[arg(long)]
    pub limit: Option<u64>,

    /// First page to fetch
    #[arg(long)]
    pub start_page: Option<u32>,

    /// Build events without dispatching them
    #[arg(long)]
    pub dry_run: bool,

    /// Clear the response cache before the run
    #[arg(long)]
    pub clear_cache: bool,

    /// Cache entry lifetime in seconds (0 disables caching)
    #[arg(long)]
    pub cache_ttl: Option<u64>,

    /// What to do when a photo cannot be enriched: abort or skip
    #[arg(long)]
    pub on_error: Option<FailurePolicy>,

    /// Write events to FILE instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stop once this photo id has been dispatched
    #[arg(long)]
    pub stop_at: Option<String>,

    /// KEY=VALUE label added to every event's context (repeatable)
    #[arg(long = "label", value_parser = parse_label)]
    pub labels: Vec<(String, String)>,
}

fn parse_label(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_need_a_key() {
        assert_eq!(
            parse_label("job = nightly").unwrap(),
            ("job".to_string(), "nightly".to_string())
        );
        assert!(parse_label("=x").is_err());
        assert!(parse_label("novalue").is_err());
    }

    #[test]
    fn search_tags_split_on_commas() {
        let cli = Cli::try_parse_from(["photoreel", "search", "--tags", "boats,night", "--tag-mode", "all"])
            .unwrap();
        match cli.command {
            Commands::Search { tags, tag_mode, .. } => {
                assert_eq!(tags, vec!["boats", "night"]);
                assert_eq!(tag_mode, TagMode::All);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn import_accepts_run_flags() {
        let cli = Cli::try_parse_from([
            "photoreel", "import", "721", "--owner", "12@N01", "--detail", "full", "--limit", "5",
            "--dry-run", "--label", "job=test",
        ])
        .unwrap();
        match cli.command {
            Commands::Import { reference, owner, run } => {
                assert_eq!(reference, "721");
                assert_eq!(owner.as_deref(), Some("12@N01"));
                assert_eq!(run.detail, Some(DetailLevel::Full));
                assert_eq!(run.limit, Some(5));
                assert!(run.dry_run);
                assert_eq!(run.labels, vec![("job".to_string(), "test".to_string())]);
            }
            _ => panic!("expected import"),
        }
    }
}
