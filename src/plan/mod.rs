//! Conversion planning.
//!
//! The planner walks a source's titles in order, applies the configured
//! gates, and produces one conversion directive per accepted title. Titles
//! that fail a gate are reported with a typed reason, never as an error.
//! Everything here is pure computation over the parsed model; spawning the
//! tool and checking the filesystem belong to the invoker.

mod args;
mod output;
mod planner;
mod preset;
mod preview;

pub use args::handbrake_args;
pub use output::{resolve_output, timestamp_now};
pub use planner::{Planner, TitleOutcome};
pub use preset::{strip_spliced_flags, PresetAudio};
pub use preview::PreviewWindow;

use anyhow::{bail, Result};
use hbrip_scan::time;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// Supported output container formats, derived from the output extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Mp4,
    Mkv,
}

impl Container {
    /// Derive the container from an output path or template.
    ///
    /// An unknown extension is a fatal configuration error; guessing a
    /// format is worse than refusing.
    pub fn from_output_path(path: &str) -> Result<Self> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("mp4") | Some("m4v") => Ok(Self::Mp4),
            Some("mkv") => Ok(Self::Mkv),
            Some(other) => bail!("unsupported output extension '.{other}'"),
            None => bail!("output '{path}' has no container extension"),
        }
    }

    /// Default audio encoder for this container, used for mixdown tracks
    /// and as the conversion fallback encoder.
    pub fn default_audio_encoder(self) -> &'static str {
        match self {
            Self::Mp4 => "faac",
            Self::Mkv => "lame",
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mp4 => write!(f, "mp4"),
            Self::Mkv => write!(f, "mkv"),
        }
    }
}

// ---------------------------------------------------------------------------
// Directives
// ---------------------------------------------------------------------------

/// One audio entry of a title's conversion.
///
/// Directives line up positionally across the comma-joined audio lists the
/// argument builder emits. A copy+mixdown pair for the same source track is
/// two directives; a preset directive may repeat the track position to match
/// the preset's own audio-list length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioDirective {
    /// Source track position(s) this directive applies to.
    pub tracks: Vec<u32>,
    pub encoder: Option<String>,
    pub rate: Option<String>,
    pub mixdown: Option<String>,
    pub bitrate: Option<String>,
    pub drc: Option<String>,
    /// Human-facing track label.
    pub name: String,
}

/// The full conversion directive for one accepted title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitlePlan {
    /// Title position on the source.
    pub title: u32,
    /// The title's block count, kept for duplicate-record rollback.
    pub blocks: i64,
    /// Output path with all template tokens resolved.
    pub output: String,
    pub container: Container,
    pub audio: Vec<AudioDirective>,
    /// Selected subtitle positions.
    pub subtitles: Vec<u32>,
    /// Chapter range passed through to the tool.
    pub chapters: Option<String>,
    pub preview: Option<PreviewWindow>,
    /// Preset text with the spliced flags stripped, when a preset is active.
    pub preset_args: Option<String>,
    /// Extra pass-through argument text.
    pub extra_args: Option<String>,
}

// ---------------------------------------------------------------------------
// Skips
// ---------------------------------------------------------------------------

/// Why a title was left out of the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotMainFeature,
    PositionNotWanted,
    TooShort { duration: i64, min: i64 },
    TooLong { duration: i64, max: i64 },
    NoAudio,
    Duplicate { blocks: i64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMainFeature => write!(f, "not the main feature"),
            Self::PositionNotWanted => write!(f, "title position not selected"),
            Self::TooShort { duration, min } => write!(
                f,
                "duration too short ({} < {})",
                time::format_duration(*duration),
                time::format_duration(*min)
            ),
            Self::TooLong { duration, max } => write!(
                f,
                "duration too long ({} > {})",
                time::format_duration(*duration),
                time::format_duration(*max)
            ),
            Self::NoAudio => write!(f, "no matching audio tracks"),
            Self::Duplicate { blocks } => {
                write!(f, "source contains the same content twice (blocks: {blocks})")
            }
        }
    }
}

/// A skipped title and the gate that rejected it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedTitle {
    pub title: u32,
    pub reason: SkipReason,
}

/// The planner's output for one source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    pub directives: Vec<TitlePlan>,
    pub skipped: Vec<SkippedTitle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_from_extension() {
        assert_eq!(Container::from_output_path("/o/x.mp4").unwrap(), Container::Mp4);
        assert_eq!(Container::from_output_path("/o/x.m4v").unwrap(), Container::Mp4);
        assert_eq!(Container::from_output_path("/o/x.MKV").unwrap(), Container::Mkv);
    }

    #[test]
    fn unknown_extension_is_fatal() {
        assert!(Container::from_output_path("/o/x.avi").is_err());
        assert!(Container::from_output_path("/o/x").is_err());
    }

    #[test]
    fn skip_reason_messages() {
        let reason = SkipReason::TooShort { duration: 300, min: 600 };
        assert_eq!(reason.to_string(), "duration too short (00:05:00 < 00:10:00)");
        assert_eq!(
            SkipReason::Duplicate { blocks: 42 }.to_string(),
            "source contains the same content twice (blocks: 42)"
        );
    }
}
