//! Scan-output parsing.
//!
//! HandBrakeCLI `--scan` emits line-oriented diagnostic text with no fixed
//! schema. The parser makes a single forward pass, keeps a current-title
//! reference plus an audio/subtitle section flag, and treats every
//! unrecognized line as noise. It never fails; a source with zero titles is
//! the caller's empty-result condition.

use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

use crate::model::{AudioTrack, Chapter, Source, Subtitle, Title};

static DVD_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"libdvdnav: DVD Title: (.*)").expect("invalid regex"));
static DVD_TITLE_ALT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"libdvdnav: DVD Title \(Alternative\): (.*)").expect("invalid regex")
});
static DVD_SERIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"libdvdnav: DVD Serial Number: (.*)").expect("invalid regex"));
static AUDIO_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+ audio tracks:").expect("invalid regex"));
static SUBTITLE_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+ (subtitles|subtitle tracks):").expect("invalid regex"));
static TITLE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+ title ([0-9]+):").expect("invalid regex"));
static MAIN_FEATURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+ Main Feature").expect("invalid regex"));
static TITLE_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+ vts .*, ttn .*, cells .* \(([0-9]+) blocks\)").expect("invalid regex")
});
static TITLE_INFO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+ size: ([0-9]+x[0-9]+).*, ([0-9.]+) fps").expect("invalid regex")
});
static DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+ duration: (.*)").expect("invalid regex"));
static CHAPTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+ ([0-9]+): cells (.*), ([0-9]+) blocks, duration (.*)").expect("invalid regex")
});
static TRACK_FULL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+ ([0-9]+), (.*?) \(iso639-2: (.*?)\), ([0-9]+Hz), ([0-9]+bps)")
        .expect("invalid regex")
});
static TRACK_SHORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+ ([0-9]+), (.*?) \(iso639-2: (.*?)\)").expect("invalid regex")
});
static DESCR_THREE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((.*?)\)\s*\((.*?)\)\s*\((.*?)\)").expect("invalid regex")
});
static DESCR_TWO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((.*?)\)\s*\((.*?)\)").expect("invalid regex"));
static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((.*?)\)").expect("invalid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Audio,
    Subtitle,
}

/// Parse the full text of a scan run into a [`Source`].
///
/// `path` is the path the scan ran against; it only feeds the source's
/// derived name, nothing is read from it.
pub fn parse_scan_output(path: impl Into<PathBuf>, text: &str) -> Source {
    let mut source = Source::new(path);
    let mut section = Section::None;
    let mut explicit_main_feature = false;

    for line in text.lines() {
        if let Some(c) = DVD_TITLE_ALT.captures(line) {
            tracing::trace!(line, "matched disc alt-title");
            source.title_alt = Some(c[1].trim().to_string());
            continue;
        }
        if let Some(c) = DVD_TITLE.captures(line) {
            tracing::trace!(line, "matched disc title");
            source.title = Some(c[1].trim().to_string());
            continue;
        }
        if let Some(c) = DVD_SERIAL.captures(line) {
            tracing::trace!(line, "matched disc serial");
            source.serial = Some(c[1].trim().to_string());
            continue;
        }
        if AUDIO_SECTION.is_match(line) {
            section = Section::Audio;
            continue;
        }
        if SUBTITLE_SECTION.is_match(line) {
            section = Section::Subtitle;
            continue;
        }
        if let Some(c) = TITLE_START.captures(line) {
            tracing::trace!(line, "matched title start");
            if let Ok(pos) = c[1].parse() {
                source.titles.push(Title::new(pos));
                section = Section::None;
            }
            continue;
        }

        // Everything below is title-scoped; before the first title these
        // lines are noise.
        let Some(title) = source.titles.last_mut() else {
            continue;
        };

        if MAIN_FEATURE.is_match(line) {
            tracing::trace!(line, "matched main feature");
            title.main_feature = true;
            explicit_main_feature = true;
        } else if let Some(c) = TITLE_BLOCKS.captures(line) {
            title.blocks = c[1].parse().unwrap_or(-1);
        } else if let Some(c) = TITLE_INFO.captures(line) {
            title.size = Some(c[1].to_string());
            title.fps = Some(c[2].to_string());
        } else if let Some(c) = CHAPTER.captures(line) {
            let Ok(pos) = c[1].parse() else { continue };
            let mut chapter = Chapter::new(pos);
            chapter.cells = Some(c[2].to_string());
            chapter.blocks = c[3].parse().ok();
            chapter.duration = Some(c[4].to_string());
            title.chapters.push(chapter);
        } else if let Some(c) = DURATION.captures(line) {
            title.duration = Some(c[1].trim().to_string());
        } else if section == Section::Audio {
            if let Some(track) = parse_audio_line(line) {
                tracing::trace!(line, "matched audio track");
                title.audio_tracks.push(track);
            }
        } else if section == Section::Subtitle {
            if let Some(subtitle) = parse_subtitle_line(line) {
                tracing::trace!(line, "matched subtitle");
                title.subtitles.push(subtitle);
            }
        }
    }

    if !explicit_main_feature {
        mark_longest_title(&mut source);
    }
    source
}

/// Parse an audio-track line, preferring the full form with sample and bit
/// rates and falling back to the reduced form file sources produce.
fn parse_audio_line(line: &str) -> Option<AudioTrack> {
    if let Some(c) = TRACK_FULL.captures(line) {
        let mut track = AudioTrack::new(c[1].parse().ok()?, &c[2]);
        decompose_description(&mut track);
        track.lang = Some(c[3].to_string());
        track.rate = Some(c[4].to_string());
        track.bitrate = Some(c[5].to_string());
        return Some(track);
    }
    let c = TRACK_SHORT.captures(line)?;
    let mut track = AudioTrack::new(c[1].parse().ok()?, &c[2]);
    decompose_description(&mut track);
    track.lang = Some(c[3].to_string());
    Some(track)
}

/// Split the inline parentheticals of an audio description into codec,
/// optional comment, and channel layout.
fn decompose_description(track: &mut AudioTrack) {
    let descr = track.descr.clone();
    if let Some(c) = DESCR_THREE.captures(&descr) {
        track.codec = Some(c[1].to_string());
        track.comment = Some(c[2].to_string());
        track.channels = Some(c[3].to_string());
    } else if let Some(c) = DESCR_TWO.captures(&descr) {
        track.codec = Some(c[1].to_string());
        track.channels = Some(c[2].to_string());
    }
}

fn parse_subtitle_line(line: &str) -> Option<Subtitle> {
    let c = TRACK_SHORT.captures(line)?;
    let mut subtitle = Subtitle::new(c[1].parse().ok()?, &c[2]);
    subtitle.comment = PARENTHETICAL.captures(&c[2]).map(|p| p[1].to_string());
    subtitle.lang = Some(c[3].to_string());
    Some(subtitle)
}

/// Fallback when the scanner never flagged a main feature: the title with
/// the greatest duration wins, first encountered on ties.
fn mark_longest_title(source: &mut Source) {
    let mut best: Option<usize> = None;
    for (i, title) in source.titles.iter().enumerate() {
        match best {
            None => best = Some(i),
            Some(b) if title.duration_secs() > source.titles[b].duration_secs() => best = Some(i),
            _ => {}
        }
    }
    if let Some(i) = best {
        source.titles[i].main_feature = true;
    }
}
