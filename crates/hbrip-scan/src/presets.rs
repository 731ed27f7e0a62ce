//! Preset catalog parsing.
//!
//! `HandBrakeCLI --preset-list` prints one `+ Name: arguments` line per
//! preset. The catalog is a plain name → raw-argument-text map; callers that
//! miss a lookup fall back to their non-preset path.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static PRESET_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+ (.*?): (.*)").expect("invalid regex"));

/// Parse `--preset-list` output into a name → argument-text map.
pub fn parse_preset_list(text: &str) -> BTreeMap<String, String> {
    let mut presets = BTreeMap::new();
    for line in text.lines() {
        if let Some(c) = PRESET_LINE.captures(line) {
            presets.insert(c[1].trim().to_string(), c[2].trim().to_string());
        }
    }
    presets
}
