//! Preset-argument splicing.
//!
//! A preset is a raw argument-text blob from the catalog. Audio-related
//! flags in it are always superseded by per-track computed values, so they
//! are stripped out of the text before it is reused, and their values are
//! extracted separately. The splicing is regex-based and tolerant: a flag
//! that fails to parse is simply absent from the result, never fatal.

use regex::Regex;

use super::AudioDirective;
use hbrip_scan::AudioTrack;

/// Flags recomputed per selected track, plus the container flag, which is
/// owned by the output extension.
const SPLICED_FLAGS: [(&str, &str); 7] = [
    ("-a", "--audio"),
    ("-E", "--aencoder"),
    ("-R", "--arate"),
    ("-6", "--mixdown"),
    ("-B", "--ab"),
    ("-D", "--drc"),
    ("-f", "--format"),
];

/// Remove the spliced flags (and their values) from raw preset text.
pub fn strip_spliced_flags(args: &str) -> String {
    let mut out = args.to_string();
    for (short, long) in SPLICED_FLAGS {
        if let Ok(re) = Regex::new(&format!(r"(?:{long}|{short}) [^ ]+[ ]*")) {
            out = re.replace_all(&out, "").into_owned();
        }
    }
    out.trim().to_string()
}

/// Audio parameters extracted from raw preset text.
///
/// Every field is independently optional; a missing or unparsable flag just
/// stays `None`.
#[derive(Debug, Clone)]
pub struct PresetAudio {
    /// Number of entries in the preset's own `--audio` list; the source
    /// track position is repeated this many times per directive.
    pub track_count: usize,
    pub encoder: Option<String>,
    pub rate: Option<String>,
    pub mixdown: Option<String>,
    pub bitrate: Option<String>,
    pub drc: Option<String>,
}

impl PresetAudio {
    pub fn from_args(args: &str) -> Self {
        let track_count = flag_value(args, "-a", "--audio")
            .map(|v| v.split(',').count())
            .unwrap_or(1);
        Self {
            track_count,
            encoder: flag_value(args, "-E", "--aencoder"),
            rate: flag_value(args, "-R", "--arate"),
            mixdown: flag_value(args, "-6", "--mixdown"),
            bitrate: flag_value(args, "-B", "--ab"),
            drc: flag_value(args, "-D", "--drc"),
        }
    }

    /// Directive for one matched track, carrying the preset's audio values.
    pub fn directive_for(&self, track: &AudioTrack) -> AudioDirective {
        AudioDirective {
            tracks: vec![track.pos; self.track_count.max(1)],
            encoder: self.encoder.clone(),
            rate: self.rate.clone(),
            mixdown: self.mixdown.clone(),
            bitrate: self.bitrate.clone(),
            drc: self.drc.clone(),
            name: track.clean_description(),
        }
    }
}

fn flag_value(args: &str, short: &str, long: &str) -> Option<String> {
    let re = Regex::new(&format!(r"(?:{long}|{short}) ([^ ]+)")).ok()?;
    re.captures(args)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIVERSAL: &str = "-e x264 -q 20.0 -a 1,1 -E faac,copy:ac3 -B 160,160 \
-6 dpl2,auto -R Auto,Auto -D 0.0,0.0 -f mp4 --loose-anamorphic -m -x cabac=0:ref=2";

    #[test]
    fn strip_removes_audio_and_format_flags() {
        let cleaned = strip_spliced_flags(UNIVERSAL);
        assert!(!cleaned.contains("-a 1,1"));
        assert!(!cleaned.contains("-E "));
        assert!(!cleaned.contains("-B "));
        assert!(!cleaned.contains("-6 "));
        assert!(!cleaned.contains("-R "));
        assert!(!cleaned.contains("-D "));
        assert!(!cleaned.contains("-f mp4"));
        assert!(cleaned.contains("-e x264"));
        assert!(cleaned.contains("-q 20.0"));
        assert!(cleaned.contains("--loose-anamorphic"));
        assert!(cleaned.contains("-x cabac=0:ref=2"));
    }

    #[test]
    fn strip_handles_long_flag_names() {
        let cleaned = strip_spliced_flags("--aencoder faac --audio 1 --quality 20.0");
        assert_eq!(cleaned, "--quality 20.0");
    }

    #[test]
    fn extracts_audio_values() {
        let audio = PresetAudio::from_args(UNIVERSAL);
        assert_eq!(audio.track_count, 2);
        assert_eq!(audio.encoder.as_deref(), Some("faac,copy:ac3"));
        assert_eq!(audio.rate.as_deref(), Some("Auto,Auto"));
        assert_eq!(audio.mixdown.as_deref(), Some("dpl2,auto"));
        assert_eq!(audio.bitrate.as_deref(), Some("160,160"));
        assert_eq!(audio.drc.as_deref(), Some("0.0,0.0"));
    }

    #[test]
    fn missing_flags_stay_absent() {
        let audio = PresetAudio::from_args("-e x264 -q 20.0");
        assert_eq!(audio.track_count, 1);
        assert_eq!(audio.encoder, None);
        assert_eq!(audio.mixdown, None);
    }

    #[test]
    fn directive_repeats_track_position() {
        let audio = PresetAudio::from_args(UNIVERSAL);
        let mut track = AudioTrack::new(2, "English (AC3) (5.1 ch)");
        track.codec = Some("AC3".to_string());
        track.channels = Some("5.1 ch".to_string());
        let directive = audio.directive_for(&track);
        assert_eq!(directive.tracks, vec![2, 2]);
        assert_eq!(directive.name, "English");
    }
}
