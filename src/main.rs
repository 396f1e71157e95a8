mod cli;

use photoreel::{
    cache::ResponseCache,
    config::{self, Config},
    pipeline::{
        CollectionPages, EventSink, PageRequestProvider, PipelineDriver, RunOptions, SearchPages,
    },
    reference::CollectionRef,
    source::{FlickrClient, PhotoSource, SearchQuery, TagMode},
    subscribers::{JsonLinesSubscriber, LogSubscriber, StopAtPhoto},
};
use photoreel_common::{Error, OwnerId, PhotoId, SafetyLevel};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, RunArgs};
use std::path::Path;
use std::sync::Arc;

fn main() {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "photoreel=debug,photoreel_common=debug".to_string()
        } else {
            "photoreel=info".to_string()
        }
    });

    // Logs go to stderr; stdout carries event output.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dispatch(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Import {
            reference,
            owner,
            run,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let reference = CollectionRef::parse(&reference, owner.as_deref())?;
            execute(config, &run, &CollectionPages::new(reference))
        }
        Commands::Search {
            text,
            tags,
            tag_mode,
            user,
            safe_search,
            sort,
            run,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let query = build_query(text, tags, tag_mode, user, sort, safe_search, &config)?;
            execute(config, &run, &SearchPages::new(query)?)
        }
        Commands::ClearCache => clear_cache(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("photoreel {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Map an error to the process exit code of its category.
fn exit_code(error: &anyhow::Error) -> i32 {
    if let Some(failure) = error.downcast_ref::<photoreel::pipeline::RunFailure>() {
        return failure.exit_code();
    }
    if let Some(error) = error.downcast_ref::<Error>() {
        return error.exit_code();
    }
    1
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    config::load_config_or_default(path).map_err(|e| Error::config(format!("{:#}", e)).into())
}

fn build_query(
    text: Option<String>,
    tags: Vec<String>,
    tag_mode: TagMode,
    user: Option<String>,
    sort: Option<String>,
    safe_search: Option<SafetyLevel>,
    config: &Config,
) -> Result<SearchQuery> {
    Ok(SearchQuery {
        text: text.filter(|t| !t.trim().is_empty()),
        tags: tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        tag_mode,
        user: user.map(OwnerId::new).transpose()?,
        safety: safe_search.unwrap_or(config.run.safe_search),
        sort,
    })
}

/// Apply command-line run flags over the `[run]` and `[cache]` sections.
fn apply_overrides(config: &mut Config, args: &RunArgs) -> Result<()> {
    let run = &mut config.run;
    if let Some(page_size) = args.page_size {
        run.page_size = page_size;
    }
    if let Some(detail) = args.detail {
        run.detail_level = detail;
    }
    if let Some(limit) = args.limit {
        run.limit = Some(limit);
    }
    if let Some(start_page) = args.start_page {
        run.start_page = start_page;
    }
    if let Some(policy) = args.on_error {
        run.on_enrichment_error = Some(policy);
    }
    run.dry_run |= args.dry_run;
    run.clear_cache |= args.clear_cache;
    if let Some(ttl) = args.cache_ttl {
        config.cache.ttl_secs = ttl;
    }

    config::validate_config(config).map_err(|e| Error::config(format!("{:#}", e)))?;
    Ok(())
}

fn build_source(config: &Config) -> Result<Arc<dyn PhotoSource>> {
    if config.source.api_key.trim().is_empty() {
        return Err(Error::config(
            "source.api_key is required to contact the photo API",
        )
        .into());
    }
    let client = FlickrClient::new(&config.source).context("Failed to build photo API client")?;
    Ok(Arc::new(client))
}

fn build_sink(args: &RunArgs) -> Result<EventSink> {
    let mut sink = EventSink::new().with(Arc::new(LogSubscriber));

    match &args.output {
        Some(path) => sink.subscribe(Arc::new(JsonLinesSubscriber::create(path)?)),
        None => sink.subscribe(Arc::new(JsonLinesSubscriber::stdout())),
    }

    if let Some(photo) = &args.stop_at {
        sink.subscribe(Arc::new(StopAtPhoto::new(PhotoId::new(photo)?)));
    }

    Ok(sink)
}

fn execute(mut config: Config, args: &RunArgs, provider: &dyn PageRequestProvider) -> Result<()> {
    apply_overrides(&mut config, args)?;

    let source = build_source(&config)?;
    let cache = ResponseCache::from_config(&config.cache);
    if config.run.clear_cache {
        cache
            .clear()
            .map_err(|e| Error::cache(format!("failed to clear cache: {}", e)))?;
        tracing::info!("Cache cleared");
    }

    let mut options = RunOptions::from_config(&config.run);
    options.tags = args.labels.iter().cloned().collect();

    let sink = build_sink(args)?;
    let driver = PipelineDriver::new(source, cache, sink, options);

    let rt = tokio::runtime::Runtime::new()?;
    match rt.block_on(driver.run(provider)) {
        Ok(report) => {
            eprintln!("Run {} {}: {}", report.run_id, report.status, report.stats);
            if let Some(page) = report.last_page {
                eprintln!("  Last page: {}", page);
            }
            Ok(())
        }
        Err(failure) => {
            eprintln!("Run failed: {}", failure.stats);
            Err(failure.into())
        }
    }
}

fn clear_cache(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let cache = ResponseCache::from_config(&config.cache);
    cache
        .clear()
        .map_err(|e| Error::cache(format!("failed to clear cache: {}", e)))?;
    println!("Cache cleared ({:?} backend)", config.cache.backend);
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p).map_err(|e| Error::config(format!("{:#}", e)))?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("✓ Configuration is valid");
    println!("  Source: {}", config.source.base_url);
    println!(
        "  API key: {}",
        if config.source.api_key.is_empty() {
            "not set"
        } else {
            "set"
        }
    );
    println!(
        "  Cache: {:?} (ttl {}s)",
        config.cache.backend, config.cache.ttl_secs
    );
    println!(
        "  Run: page size {}, detail {}, start page {}",
        config.run.page_size, config.run.detail_level, config.run.start_page
    );
    if let Some(limit) = config.run.limit {
        println!("  Limit: {}", limit);
    }

    Ok(())
}
