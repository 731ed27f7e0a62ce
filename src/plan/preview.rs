//! Preview-window normalization.

use anyhow::{bail, Context, Result};
use hbrip_scan::time;
use serde::{Deserialize, Serialize};

/// A normalized preview window in seconds.
///
/// Parsed from `start` or `start-stop` specs, where each time is `hh:mm:ss`
/// or a bare number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewWindow {
    pub start: i64,
    pub duration: i64,
}

impl PreviewWindow {
    /// Parse a preview spec.
    ///
    /// A lone start gets the default 60-second duration; a `start-stop` pair
    /// runs for `stop - start`. A stop before the start is a configuration
    /// error, not something to clamp.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let (start_part, stop_part) = match spec.split_once('-') {
            Some((start, stop)) => (start, Some(stop)),
            None => (spec, None),
        };
        let start = time::parse_duration(start_part)
            .with_context(|| format!("invalid preview start '{start_part}'"))?;
        let duration = match stop_part {
            None => 60,
            Some(stop_part) => {
                let stop = time::parse_duration(stop_part)
                    .with_context(|| format!("invalid preview stop '{stop_part}'"))?;
                if stop < start {
                    bail!(
                        "preview stop {} is before start {}",
                        time::format_duration(stop),
                        time::format_duration(start)
                    );
                }
                stop - start
            }
        };
        Ok(Self { start, duration })
    }
}
