//! Configuration loading and validation.

mod types;

pub use types::*;

use anyhow::{Context, Result};
use hbrip_scan::time;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return the default config.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./hbrip.toml",
        "~/.config/hbrip/config.toml",
        "/etc/hbrip/config.toml",
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

static CHAPTER_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(-[0-9]+)?$").expect("invalid regex"));

/// Validate configuration.
fn validate_config(config: &Config) -> Result<()> {
    for (what, value) in [
        ("min_length", &config.selection.min_length),
        ("max_length", &config.selection.max_length),
    ] {
        if let Some(v) = value {
            if !v.trim().is_empty() && time::parse_duration(v).is_none() {
                anyhow::bail!("selection.{what} '{v}' is not a duration");
            }
        }
    }

    for mapping in &config.audio.mixdown_mappings {
        Regex::new(&mapping.pattern)
            .with_context(|| format!("invalid mixdown pattern '{}'", mapping.pattern))?;
    }

    if let Some(chapters) = &config.conversion.chapters {
        if !CHAPTER_RANGE.is_match(chapters.trim()) {
            anyhow::bail!("conversion.chapters '{chapters}' is not a chapter or range");
        }
    }

    Ok(())
}
