//! Title and track selection.
//!
//! One mechanism drives all of "rip these title positions" and "keep these
//! audio/subtitle languages, optionally only the first track per language,
//! optionally excluding commentary tracks": an ordered allow-list filter
//! keyed by an extracted value.

mod matcher;

pub use matcher::ValueMatcher;

use anyhow::{bail, Result};
use hbrip_scan::{AudioTrack, Subtitle, Title};
use regex::Regex;
use std::sync::LazyLock;

/// Matcher selecting titles by printed position.
pub type TitleMatcher = ValueMatcher<Title, u32>;

/// Matcher selecting audio tracks by ISO 639-2 language.
pub type AudioMatcher = ValueMatcher<AudioTrack, String>;

/// Matcher selecting subtitles by ISO 639-2 language.
pub type SubtitleMatcher = ValueMatcher<Subtitle, String>;

/// Title matcher over an optional position allow-list.
pub fn title_matcher(positions: Option<Vec<u32>>) -> TitleMatcher {
    ValueMatcher::new(positions, |t: &Title| Some(t.pos))
}

/// Audio matcher over an optional language allow-list.
pub fn audio_matcher(
    languages: Option<Vec<String>>,
    skip_commentary: bool,
    only_first_per_language: bool,
) -> AudioMatcher {
    let matcher = ValueMatcher::new(languages, |t: &AudioTrack| t.lang.clone())
        .only_first_per_value(only_first_per_language);
    if skip_commentary {
        matcher.with_reject(|t: &AudioTrack| t.commentary())
    } else {
        matcher
    }
}

/// Subtitle matcher over an optional language allow-list.
pub fn subtitle_matcher(
    languages: Option<Vec<String>>,
    skip_commentary: bool,
    only_first_per_language: bool,
) -> SubtitleMatcher {
    let matcher = ValueMatcher::new(languages, |s: &Subtitle| s.lang.clone())
        .only_first_per_value(only_first_per_language);
    if skip_commentary {
        matcher.with_reject(|s: &Subtitle| s.commentary())
    } else {
        matcher
    }
}

static POSITION_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)-([0-9]+)$").expect("invalid regex"));

/// Expand a list of title-position specs (`"3"`, `"2-5"`) into positions,
/// de-duplicated, in spec order.
pub fn parse_position_list(specs: &[String]) -> Result<Vec<u32>> {
    fn push(p: u32, positions: &mut Vec<u32>) {
        if !positions.contains(&p) {
            positions.push(p);
        }
    }

    let mut positions = Vec::new();
    for spec in specs {
        let spec = spec.trim();
        if let Some(c) = POSITION_RANGE.captures(spec) {
            let (start, end): (u32, u32) = match (c[1].parse(), c[2].parse()) {
                (Ok(s), Ok(e)) => (s, e),
                _ => bail!("invalid title range '{spec}'"),
            };
            if start > end {
                bail!("invalid title range '{spec}'");
            }
            for p in start..=end {
                push(p, &mut positions);
            }
        } else if let Ok(p) = spec.parse() {
            push(p, &mut positions);
        } else {
            bail!("invalid title position '{spec}'");
        }
    }
    Ok(positions)
}
