//! Media model built from scan output.
//!
//! A [`Source`] owns its [`Title`]s; each title owns its chapters, audio
//! tracks, and subtitles. The parser constructs everything; matching and
//! planning only ever read it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::time;

/// Basenames that mark a disc directory structure rather than content.
const DISC_STRUCTURE_DIRS: [&str; 2] = ["VIDEO_TS", "AUDIO_TS"];

/// A scanned media source: a disc, a disc directory, or a single file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Source {
    /// Path the scan ran against.
    pub path: PathBuf,
    /// Disc title as reported by the scanner.
    pub title: Option<String>,
    /// Alternative disc title, when the scanner reports one.
    pub title_alt: Option<String>,
    /// Disc serial number.
    pub serial: Option<String>,
    /// Titles in encounter order.
    pub titles: Vec<Title>,
}

impl Source {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Human-facing name for this source.
    ///
    /// Prefers the alternative title when `use_alt` is set, then the raw
    /// title, then a name derived from the path. A disc-structure basename
    /// (`VIDEO_TS`/`AUDIO_TS`) climbs one level; otherwise the file stem is
    /// used. Falls back to `"unknown"`.
    pub fn name(&self, use_alt: bool) -> String {
        if use_alt {
            if let Some(t) = self.title_alt.as_deref().filter(|t| usable(t)) {
                return t.to_string();
            }
        }
        if let Some(t) = self.title.as_deref().filter(|t| usable(t)) {
            return t.to_string();
        }
        if let Some(n) = self.path_name().filter(|n| usable(n)) {
            return n;
        }
        "unknown".to_string()
    }

    fn path_name(&self) -> Option<String> {
        let base = self.path.file_name()?.to_string_lossy();
        if DISC_STRUCTURE_DIRS.contains(&base.as_ref()) {
            let parent = self.path.parent()?;
            return Some(parent.file_name()?.to_string_lossy().into_owned());
        }
        Some(self.path.file_stem()?.to_string_lossy().into_owned())
    }

    /// The title flagged as the main feature, if any.
    pub fn main_feature(&self) -> Option<&Title> {
        self.titles.iter().find(|t| t.main_feature)
    }
}

/// Whether a reported string is meaningful enough to display.
fn usable(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s != "unknown"
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (title={}, alt={}, serial={}, name={})",
            self.path.display(),
            self.title.as_deref().unwrap_or("-"),
            self.title_alt.as_deref().unwrap_or("-"),
            self.serial.as_deref().unwrap_or("-"),
            self.name(false),
        )
    }
}

/// One playable program on the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Title {
    /// Position as printed by the scanner; not necessarily contiguous.
    pub pos: u32,
    /// Sector count, used as a coarse content fingerprint. -1 = unknown.
    pub blocks: i64,
    /// Pixel dimensions, e.g. `720x576`.
    pub size: Option<String>,
    /// Frame rate as printed, e.g. `25.000`.
    pub fps: Option<String>,
    /// Duration as printed, `hh:mm:ss`.
    pub duration: Option<String>,
    /// Whether the scanner (or the fallback) marked this the main feature.
    pub main_feature: bool,
    pub chapters: Vec<Chapter>,
    pub audio_tracks: Vec<AudioTrack>,
    pub subtitles: Vec<Subtitle>,
}

impl Title {
    pub fn new(pos: u32) -> Self {
        Self {
            pos,
            blocks: -1,
            size: None,
            fps: None,
            duration: None,
            main_feature: false,
            chapters: Vec::new(),
            audio_tracks: Vec::new(),
            subtitles: Vec::new(),
        }
    }

    /// Duration in seconds, or -1 when missing or unparsable.
    pub fn duration_secs(&self) -> i64 {
        self.duration
            .as_deref()
            .and_then(time::parse_duration)
            .unwrap_or(-1)
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let langs = |v: &[Option<String>]| -> String {
            v.iter()
                .map(|l| l.as_deref().unwrap_or("?"))
                .collect::<Vec<_>>()
                .join(",")
        };
        let audio: Vec<Option<String>> =
            self.audio_tracks.iter().map(|t| t.lang.clone()).collect();
        let subs: Vec<Option<String>> = self.subtitles.iter().map(|s| s.lang.clone()).collect();
        write!(
            f,
            "title {:02}: {}, {}, {} fps, main-feature: {}, blocks: {}, chapters: {}, audio: [{}], subtitles: [{}]",
            self.pos,
            self.duration.as_deref().unwrap_or("unknown"),
            self.size.as_deref().unwrap_or("unknown"),
            self.fps.as_deref().unwrap_or("unknown"),
            self.main_feature,
            self.blocks,
            self.chapters.len(),
            langs(&audio),
            langs(&subs),
        )
    }
}

/// A chapter within a title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub pos: u32,
    /// Cell range descriptor as printed, e.g. `0->1`.
    pub cells: Option<String>,
    pub blocks: Option<i64>,
    pub duration: Option<String>,
}

impl Chapter {
    pub fn new(pos: u32) -> Self {
        Self {
            pos,
            cells: None,
            blocks: None,
            duration: None,
        }
    }
}

impl fmt::Display for Chapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. {} (cells={}, blocks={})",
            self.pos,
            self.duration.as_deref().unwrap_or("unknown"),
            self.cells.as_deref().unwrap_or("-"),
            self.blocks.map_or_else(|| "-".to_string(), |b| b.to_string()),
        )
    }
}

/// An audio track within a title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioTrack {
    pub pos: u32,
    /// Raw description as printed, e.g. `English (AC3) (5.1 ch)`.
    pub descr: String,
    pub codec: Option<String>,
    /// Inline parenthetical comment, e.g. `Director's Commentary`.
    pub comment: Option<String>,
    /// Channel layout, e.g. `5.1 ch`.
    pub channels: Option<String>,
    /// ISO 639-2 language code.
    pub lang: Option<String>,
    /// Sample rate as printed, e.g. `48000Hz`.
    pub rate: Option<String>,
    /// Bit rate as printed, e.g. `448000bps`.
    pub bitrate: Option<String>,
}

impl AudioTrack {
    pub fn new(pos: u32, descr: impl Into<String>) -> Self {
        Self {
            pos,
            descr: descr.into(),
            codec: None,
            comment: None,
            channels: None,
            lang: None,
            rate: None,
            bitrate: None,
        }
    }

    /// Whether the description marks this as a commentary track.
    pub fn commentary(&self) -> bool {
        self.descr.to_lowercase().contains("commentary")
    }

    /// Description with the codec and channel substrings stripped, for
    /// human-facing track naming.
    pub fn clean_description(&self) -> String {
        let mut d = self.descr.clone();
        for part in [&self.codec, &self.channels].into_iter().flatten() {
            let wrapped = format!("({part})");
            if d.contains(&wrapped) {
                d = d.replace(&wrapped, "");
            } else {
                d = d.replace(part.as_str(), "");
            }
        }
        d.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl fmt::Display for AudioTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. {} (lang={}, codec={}, channels={}, rate={}, bitrate={}, commentary={})",
            self.pos,
            self.descr,
            self.lang.as_deref().unwrap_or("-"),
            self.codec.as_deref().unwrap_or("-"),
            self.channels.as_deref().unwrap_or("-"),
            self.rate.as_deref().unwrap_or("-"),
            self.bitrate.as_deref().unwrap_or("-"),
            self.commentary(),
        )
    }
}

/// A subtitle track within a title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtitle {
    pub pos: u32,
    /// Raw description as printed, e.g. `English (Closed Caption)`.
    pub descr: String,
    /// Inline parenthetical comment, when the description carries one.
    pub comment: Option<String>,
    /// ISO 639-2 language code.
    pub lang: Option<String>,
}

impl Subtitle {
    pub fn new(pos: u32, descr: impl Into<String>) -> Self {
        Self {
            pos,
            descr: descr.into(),
            comment: None,
            lang: None,
        }
    }

    /// Whether the description marks this as a commentary track.
    pub fn commentary(&self) -> bool {
        self.descr.to_lowercase().contains("commentary")
    }
}

impl fmt::Display for Subtitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. {} (lang={}, comment={}, commentary={})",
            self.pos,
            self.descr,
            self.lang.as_deref().unwrap_or("-"),
            self.comment.as_deref().unwrap_or("-"),
            self.commentary(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_name_prefers_alt_when_requested() {
        let mut source = Source::new("/dev/sr0");
        source.title = Some("MOVIE_DISC".to_string());
        source.title_alt = Some("Movie Disc".to_string());
        assert_eq!(source.name(true), "Movie Disc");
        assert_eq!(source.name(false), "MOVIE_DISC");
    }

    #[test]
    fn source_name_skips_unusable_titles() {
        let mut source = Source::new("/media/Movie Night/movie.iso");
        source.title = Some("unknown".to_string());
        source.title_alt = Some("   ".to_string());
        assert_eq!(source.name(true), "movie");
    }

    #[test]
    fn source_name_climbs_out_of_disc_structure() {
        let source = Source::new("/media/Movie Night/VIDEO_TS");
        assert_eq!(source.name(false), "Movie Night");
    }

    #[test]
    fn source_name_falls_back_to_unknown() {
        let source = Source::new("/");
        assert_eq!(source.name(false), "unknown");
    }

    #[test]
    fn title_duration_secs() {
        let mut title = Title::new(1);
        assert_eq!(title.duration_secs(), -1);
        title.duration = Some("00:05:00".to_string());
        assert_eq!(title.duration_secs(), 300);
    }

    #[test]
    fn commentary_is_case_insensitive() {
        let track = AudioTrack::new(2, "English (AC3) (Director's Commentary) (2.0 ch)");
        assert!(track.commentary());
        let track = AudioTrack::new(3, "English (AC3) (5.1 ch)");
        assert!(!track.commentary());
    }

    #[test]
    fn clean_description_strips_codec_and_channels() {
        let mut track = AudioTrack::new(1, "English (AC3) (5.1 ch)");
        track.codec = Some("AC3".to_string());
        track.channels = Some("5.1 ch".to_string());
        assert_eq!(track.clean_description(), "English");
    }

    #[test]
    fn clean_description_keeps_comment() {
        let mut track = AudioTrack::new(1, "English (AC3) (Director's Commentary) (2.0 ch)");
        track.codec = Some("AC3".to_string());
        track.comment = Some("Director's Commentary".to_string());
        track.channels = Some("2.0 ch".to_string());
        assert_eq!(track.clean_description(), "English (Director's Commentary)");
    }
}
