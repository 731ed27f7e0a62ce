use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub video: VideoConfig,

    #[serde(default)]
    pub conversion: ConversionConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Output path template; `#pos#`, `#size#`, `#fps#`, `#ts#`, `#title#`,
    /// and `#input#` are substituted per title.
    #[serde(default)]
    pub template: Option<String>,

    /// Overwrite existing output files instead of skipping the title.
    #[serde(default)]
    pub force: bool,

    /// Prefer the scanner's alternative disc title for `#title#`.
    #[serde(default)]
    pub use_alternate_title: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SelectionConfig {
    /// Only convert the main feature.
    #[serde(default)]
    pub main_feature_only: bool,

    /// Title positions to convert; entries may be single positions or
    /// ranges like `"2-5"`. Absent = all titles.
    #[serde(default)]
    pub titles: Option<Vec<String>>,

    /// ISO 639-2 audio languages to keep, in preference order.
    /// Absent = all tracks.
    #[serde(default)]
    pub audio_languages: Option<Vec<String>>,

    /// ISO 639-2 subtitle languages to keep, in preference order.
    /// Absent = all subtitles; empty = none.
    #[serde(default)]
    pub subtitle_languages: Option<Vec<String>>,

    /// Drop commentary tracks regardless of language.
    #[serde(default)]
    pub skip_commentary: bool,

    /// Keep only the first track per language.
    #[serde(default)]
    pub only_first_per_language: bool,

    /// Minimum title duration (`hh:mm:ss`), absent = no bound.
    #[serde(default)]
    pub min_length: Option<String>,

    /// Maximum title duration (`hh:mm:ss`), absent = no bound.
    #[serde(default)]
    pub max_length: Option<String>,

    /// Skip titles whose block count matches an already-accepted title.
    #[serde(default)]
    pub skip_duplicates: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioConfig {
    /// Emit a passthrough copy of each selected track.
    #[serde(default)]
    pub copy: bool,

    /// Emit a mixed-down version of each selected track.
    #[serde(default = "default_true")]
    pub mixdown: bool,

    /// Encoder for mixdown tracks; defaults to the container's choice.
    #[serde(default)]
    pub mixdown_encoder: Option<String>,

    /// Bit rate for mixdown tracks, in kbit/s.
    #[serde(default = "default_mixdown_bitrate")]
    pub mixdown_bitrate: String,

    /// Mixdown used when no mapping rule matches.
    #[serde(default = "default_mixdown")]
    pub default_mixdown: String,

    /// Ordered description-pattern → mixdown rules. The mixdown value
    /// `"copy"` forces a passthrough copy for matching tracks instead.
    #[serde(default)]
    pub mixdown_mappings: Vec<MixdownMapping>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            copy: false,
            mixdown: default_true(),
            mixdown_encoder: None,
            mixdown_bitrate: default_mixdown_bitrate(),
            default_mixdown: default_mixdown(),
            mixdown_mappings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MixdownMapping {
    /// Regex matched against the track's raw description.
    pub pattern: String,
    pub mixdown: String,
}

fn default_true() -> bool {
    true
}
fn default_mixdown_bitrate() -> String {
    "160".to_string()
}
fn default_mixdown() -> String {
    "dpl2".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VideoConfig {
    /// Let the tool autocrop instead of forcing zero crop.
    #[serde(default)]
    pub autocrop: bool,

    #[serde(default)]
    pub max_width: Option<u32>,

    #[serde(default)]
    pub max_height: Option<u32>,

    #[serde(default)]
    pub x264_profile: Option<String>,

    #[serde(default)]
    pub x264_preset: Option<String>,

    #[serde(default)]
    pub x264_tune: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConversionConfig {
    /// Preset name looked up in the tool's preset catalog.
    #[serde(default)]
    pub preset: Option<String>,

    /// Preview window spec, `start` or `start-stop`.
    #[serde(default)]
    pub preview: Option<String>,

    /// Chapter range passed through, e.g. `"3"` or `"1-4"`.
    #[serde(default)]
    pub chapters: Option<String>,

    /// Extra argument text passed through to the tool verbatim.
    #[serde(default)]
    pub extra_args: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Explicit HandBrakeCLI path; otherwise `$PATH` is searched.
    #[serde(default)]
    pub handbrake: Option<PathBuf>,
}
