mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Largest page the source will serve in one call.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./photoreel.toml",
        "~/.config/photoreel/config.toml",
        "/etc/photoreel/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Expand a leading `~` in a configured path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let run = &config.run;
    if run.page_size == 0 || run.page_size > MAX_PAGE_SIZE {
        anyhow::bail!(
            "run.page_size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE,
            run.page_size
        );
    }
    if run.start_page == 0 {
        anyhow::bail!("run.start_page is 1-based and cannot be 0");
    }
    if run.limit == Some(0) {
        anyhow::bail!("run.limit must be at least 1 (omit it for no limit)");
    }

    let source = &config.source;
    if source.requests_per_second == 0 {
        anyhow::bail!("source.requests_per_second cannot be 0");
    }
    if source.timeout_secs == 0 {
        anyhow::bail!("source.timeout_secs cannot be 0");
    }
    if source.base_url.trim().is_empty() {
        anyhow::bail!("source.base_url cannot be empty");
    }
    if source.api_key.is_empty() {
        tracing::warn!("source.api_key is not set; requests to the photo API will be rejected");
    }

    if config.cache.backend == CacheBackendKind::File
        && config.cache.directory.as_os_str().is_empty()
    {
        anyhow::bail!("cache.backend = \"file\" requires cache.directory");
    }

    Ok(())
}
