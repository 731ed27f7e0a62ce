//! The per-title planning engine.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;

use hbrip_scan::{time, AudioTrack, Source, Title};

use super::{
    output, preset::PresetAudio, strip_spliced_flags, AudioDirective, Container, Plan,
    PreviewWindow, SkipReason, SkippedTitle, TitlePlan,
};
use crate::config::Config;
use crate::select::{AudioMatcher, SubtitleMatcher, TitleMatcher};

/// Result of gating a single title.
#[derive(Debug, Clone)]
pub enum TitleOutcome {
    Planned(TitlePlan),
    Skipped(SkipReason),
}

/// A resolved preset: the cleaned argument text plus the audio values that
/// were spliced out of it.
#[derive(Debug, Clone)]
struct ActivePreset {
    cleaned: String,
    audio: PresetAudio,
}

/// Plans conversions for the titles of a source.
///
/// All configuration is resolved up front; fatal configuration errors
/// (unknown output container, bad preview spec, bad mixdown pattern) surface
/// at construction, before any title is considered. The only state carried
/// across titles is the accepted-block-count set backing duplicate
/// detection.
#[derive(Debug)]
pub struct Planner {
    titles: TitleMatcher,
    audio: AudioMatcher,
    subtitles: SubtitleMatcher,

    main_feature_only: bool,
    min_length: i64,
    max_length: i64,
    skip_duplicates: bool,

    template: String,
    container: Container,
    use_alt_title: bool,
    timestamp: String,

    audio_copy: bool,
    audio_mixdown: bool,
    mixdown_encoder: Option<String>,
    mixdown_bitrate: String,
    default_mixdown: String,
    mixdown_rules: Vec<(Regex, String)>,

    preset: Option<ActivePreset>,
    preview: Option<PreviewWindow>,
    chapters: Option<String>,
    extra_args: Option<String>,

    accepted_blocks: Vec<i64>,
}

impl Planner {
    /// Build a planner from configuration, matchers, and the preset catalog.
    pub fn new(
        config: &Config,
        titles: TitleMatcher,
        audio: AudioMatcher,
        subtitles: SubtitleMatcher,
        presets: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let template = config
            .output
            .template
            .clone()
            .context("no output template configured")?;
        let container = Container::from_output_path(&template)?;

        let preview = config
            .conversion
            .preview
            .as_deref()
            .map(PreviewWindow::parse)
            .transpose()?;

        let mut mixdown_rules = Vec::new();
        for mapping in &config.audio.mixdown_mappings {
            let re = Regex::new(&mapping.pattern)
                .with_context(|| format!("invalid mixdown pattern '{}'", mapping.pattern))?;
            mixdown_rules.push((re, mapping.mixdown.clone()));
        }

        let preset = match config.conversion.preset.as_deref() {
            None => None,
            Some(name) => match presets.get(name) {
                Some(raw) => Some(ActivePreset {
                    cleaned: strip_spliced_flags(raw),
                    audio: PresetAudio::from_args(raw),
                }),
                None => {
                    tracing::warn!("preset '{name}' not found, converting without a preset");
                    None
                }
            },
        };

        Ok(Self {
            titles,
            audio,
            subtitles,
            main_feature_only: config.selection.main_feature_only,
            min_length: parse_bound(config.selection.min_length.as_deref(), "min_length")?,
            max_length: parse_bound(config.selection.max_length.as_deref(), "max_length")?,
            skip_duplicates: config.selection.skip_duplicates,
            template,
            container,
            use_alt_title: config.output.use_alternate_title,
            timestamp: output::timestamp_now(),
            audio_copy: config.audio.copy,
            audio_mixdown: config.audio.mixdown,
            mixdown_encoder: config.audio.mixdown_encoder.clone(),
            mixdown_bitrate: config.audio.mixdown_bitrate.clone(),
            default_mixdown: config.audio.default_mixdown.clone(),
            mixdown_rules,
            preset,
            preview,
            chapters: config.conversion.chapters.clone(),
            extra_args: config.conversion.extra_args.clone(),
            accepted_blocks: Vec::new(),
        })
    }

    /// Pin the `#ts#` timestamp instead of using the current time.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// Gate one title and, if it passes, produce its conversion directive.
    ///
    /// Gates short-circuit in a fixed order; the first failure names the
    /// skip reason. An accepted title's block count is recorded for
    /// duplicate detection even if the invoker later drops the title.
    pub fn plan_title(&mut self, source: &Source, title: &Title) -> TitleOutcome {
        use TitleOutcome::Skipped;

        if self.main_feature_only && !title.main_feature {
            return Skipped(SkipReason::NotMainFeature);
        }
        if !self.titles.matches(title) {
            return Skipped(SkipReason::PositionNotWanted);
        }
        let duration = title.duration_secs();
        if self.min_length >= 0 && duration < self.min_length {
            return Skipped(SkipReason::TooShort {
                duration,
                min: self.min_length,
            });
        }
        if self.max_length >= 0 && duration > self.max_length {
            return Skipped(SkipReason::TooLong {
                duration,
                max: self.max_length,
            });
        }
        let tracks = self.audio.filter(&title.audio_tracks);
        if tracks.is_empty() {
            return Skipped(SkipReason::NoAudio);
        }
        if self.skip_duplicates
            && title.blocks >= 0
            && self.accepted_blocks.contains(&title.blocks)
        {
            return Skipped(SkipReason::Duplicate {
                blocks: title.blocks,
            });
        }
        if title.blocks >= 0 {
            self.accepted_blocks.push(title.blocks);
        }

        let output = output::resolve_output(
            &self.template,
            source,
            title,
            &self.timestamp,
            self.use_alt_title,
        );
        let audio = self.audio_directives(&tracks);
        let subtitles = self
            .subtitles
            .filter(&title.subtitles)
            .iter()
            .map(|s| s.pos)
            .collect();

        TitleOutcome::Planned(TitlePlan {
            title: title.pos,
            blocks: title.blocks,
            output,
            container: self.container,
            audio,
            subtitles,
            chapters: self.chapters.clone(),
            preview: self.preview,
            preset_args: self.preset.as_ref().map(|p| p.cleaned.clone()),
            extra_args: self.extra_args.clone(),
        })
    }

    /// Plan every title of a source in encounter order.
    pub fn plan_source(&mut self, source: &Source) -> Plan {
        let mut plan = Plan::default();
        for title in &source.titles {
            tracing::info!("checking {title}");
            match self.plan_title(source, title) {
                TitleOutcome::Planned(directive) => {
                    tracing::info!("planned title {} -> {}", directive.title, directive.output);
                    plan.directives.push(directive);
                }
                TitleOutcome::Skipped(reason) => {
                    tracing::info!("skipping title {}: {reason}", title.pos);
                    plan.skipped.push(SkippedTitle {
                        title: title.pos,
                        reason,
                    });
                }
            }
        }
        plan
    }

    /// Drop a block count from the accepted set after the invoker reports a
    /// failed conversion, so a retry is not misclassified as a duplicate.
    pub fn forget(&mut self, blocks: i64) {
        if let Some(i) = self.accepted_blocks.iter().position(|&b| b == blocks) {
            self.accepted_blocks.remove(i);
        }
    }

    /// Up to two directives per matched track (copy and/or mixdown), or one
    /// preset-derived directive when a preset is active.
    fn audio_directives(&self, tracks: &[&AudioTrack]) -> Vec<AudioDirective> {
        let mut directives = Vec::new();
        for track in tracks {
            tracing::debug!("audio-track {track}");

            if let Some(preset) = &self.preset {
                directives.push(preset.audio.directive_for(track));
                continue;
            }

            let mut copy_track = self.audio_copy;
            let mut mixdown = None;
            if self.audio_mixdown {
                match self.resolve_mixdown(track) {
                    m if m == "copy" => copy_track = true,
                    m => mixdown = Some(m),
                }
            }

            if copy_track {
                directives.push(AudioDirective {
                    tracks: vec![track.pos],
                    encoder: Some("copy".to_string()),
                    rate: Some("auto".to_string()),
                    mixdown: Some("auto".to_string()),
                    bitrate: Some("auto".to_string()),
                    drc: Some("0.0".to_string()),
                    name: track.descr.clone(),
                });
            }
            if let Some(mixdown) = mixdown {
                let encoder = self
                    .mixdown_encoder
                    .clone()
                    .unwrap_or_else(|| self.container.default_audio_encoder().to_string());
                directives.push(AudioDirective {
                    tracks: vec![track.pos],
                    encoder: Some(encoder),
                    rate: Some("auto".to_string()),
                    mixdown: Some(mixdown.clone()),
                    bitrate: Some(self.mixdown_bitrate.clone()),
                    drc: Some("0.0".to_string()),
                    name: format!("{} ({})", track.clean_description(), mixdown_label(&mixdown)),
                });
            }
        }
        directives
    }

    /// First matching mapping rule wins; otherwise the configured default.
    fn resolve_mixdown(&self, track: &AudioTrack) -> String {
        for (pattern, mixdown) in &self.mixdown_rules {
            if pattern.is_match(&track.descr) {
                return mixdown.clone();
            }
        }
        self.default_mixdown.clone()
    }
}

fn parse_bound(value: Option<&str>, what: &str) -> Result<i64> {
    match value {
        None => Ok(-1),
        Some(s) if s.trim().is_empty() => Ok(-1),
        Some(s) => {
            time::parse_duration(s).with_context(|| format!("{what} '{s}' is not a duration"))
        }
    }
}

/// Human-readable qualifier for a mixdown mode.
fn mixdown_label(mixdown: &str) -> &str {
    match mixdown {
        "mono" => "Mono",
        "stereo" => "Stereo",
        "dpl1" => "Dolby Surround",
        "dpl2" => "Dolby Pro Logic II",
        "6ch" => "5.1",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MixdownMapping;
    use crate::select::{audio_matcher, subtitle_matcher, title_matcher};

    fn base_config(template: &str) -> Config {
        let mut config = Config::default();
        config.output.template = Some(template.to_string());
        config
    }

    fn planner(config: &Config) -> Planner {
        Planner::new(
            config,
            title_matcher(None),
            audio_matcher(None, false, false),
            subtitle_matcher(None, false, false),
            &BTreeMap::new(),
        )
        .unwrap()
        .with_timestamp("ts")
    }

    fn title_with_audio(pos: u32, duration: &str) -> Title {
        let mut title = Title::new(pos);
        title.duration = Some(duration.to_string());
        let mut track = AudioTrack::new(1, "English (AC3) (5.1 ch)");
        track.codec = Some("AC3".to_string());
        track.channels = Some("5.1 ch".to_string());
        track.lang = Some("eng".to_string());
        title.audio_tracks.push(track);
        title
    }

    #[test]
    fn unknown_container_is_fatal_at_construction() {
        let config = base_config("/out/#pos#.avi");
        let result = Planner::new(
            &config,
            title_matcher(None),
            audio_matcher(None, false, false),
            subtitle_matcher(None, false, false),
            &BTreeMap::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn duration_gates() {
        let mut config = base_config("/out/#pos#.mp4");
        config.selection.min_length = Some("00:10:00".to_string());
        let mut p = planner(&config);
        let source = Source::new("/dev/sr0");

        let short = title_with_audio(1, "00:05:00");
        assert!(matches!(
            p.plan_title(&source, &short),
            TitleOutcome::Skipped(SkipReason::TooShort { duration: 300, min: 600 })
        ));

        let long_enough = title_with_audio(2, "00:15:00");
        assert!(matches!(
            p.plan_title(&source, &long_enough),
            TitleOutcome::Planned(_)
        ));
    }

    #[test]
    fn no_bounds_keeps_short_titles() {
        let config = base_config("/out/#pos#.mp4");
        let mut p = planner(&config);
        let source = Source::new("/dev/sr0");
        let title = title_with_audio(1, "00:05:00");
        assert!(matches!(p.plan_title(&source, &title), TitleOutcome::Planned(_)));
    }

    #[test]
    fn duplicate_blocks_skip_second_title() {
        let mut config = base_config("/out/#pos#.mp4");
        config.selection.skip_duplicates = true;
        let mut p = planner(&config);
        let source = Source::new("/dev/sr0");

        let mut first = title_with_audio(1, "01:00:00");
        first.blocks = 5000;
        let mut second = title_with_audio(2, "01:00:00");
        second.blocks = 5000;

        assert!(matches!(p.plan_title(&source, &first), TitleOutcome::Planned(_)));
        assert!(matches!(
            p.plan_title(&source, &second),
            TitleOutcome::Skipped(SkipReason::Duplicate { blocks: 5000 })
        ));
    }

    #[test]
    fn unknown_blocks_never_count_as_duplicates() {
        let mut config = base_config("/out/#pos#.mp4");
        config.selection.skip_duplicates = true;
        let mut p = planner(&config);
        let source = Source::new("/dev/sr0");

        let first = title_with_audio(1, "01:00:00");
        let second = title_with_audio(2, "01:00:00");
        assert!(matches!(p.plan_title(&source, &first), TitleOutcome::Planned(_)));
        assert!(matches!(p.plan_title(&source, &second), TitleOutcome::Planned(_)));
    }

    #[test]
    fn forget_allows_retry() {
        let mut config = base_config("/out/#pos#.mp4");
        config.selection.skip_duplicates = true;
        let mut p = planner(&config);
        let source = Source::new("/dev/sr0");

        let mut title = title_with_audio(1, "01:00:00");
        title.blocks = 5000;
        assert!(matches!(p.plan_title(&source, &title), TitleOutcome::Planned(_)));
        p.forget(5000);
        assert!(matches!(p.plan_title(&source, &title), TitleOutcome::Planned(_)));
    }

    #[test]
    fn main_feature_gate() {
        let mut config = base_config("/out/#pos#.mp4");
        config.selection.main_feature_only = true;
        let mut p = planner(&config);
        let source = Source::new("/dev/sr0");

        let extra = title_with_audio(1, "00:30:00");
        assert!(matches!(
            p.plan_title(&source, &extra),
            TitleOutcome::Skipped(SkipReason::NotMainFeature)
        ));

        let mut feature = title_with_audio(2, "01:30:00");
        feature.main_feature = true;
        assert!(matches!(p.plan_title(&source, &feature), TitleOutcome::Planned(_)));
    }

    #[test]
    fn no_matching_audio_skips_title() {
        let config = base_config("/out/#pos#.mp4");
        let mut p = Planner::new(
            &config,
            title_matcher(None),
            audio_matcher(Some(vec!["deu".to_string()]), false, false),
            subtitle_matcher(None, false, false),
            &BTreeMap::new(),
        )
        .unwrap();
        let source = Source::new("/dev/sr0");
        let title = title_with_audio(1, "01:00:00");
        assert!(matches!(
            p.plan_title(&source, &title),
            TitleOutcome::Skipped(SkipReason::NoAudio)
        ));
    }

    #[test]
    fn mixdown_directive_defaults() {
        let config = base_config("/out/#title#_#pos#.mp4");
        let mut p = planner(&config);
        let mut source = Source::new("/media/MOVIE");
        source.title = Some("Movie".to_string());
        let title = title_with_audio(1, "01:00:00");

        let TitleOutcome::Planned(directive) = p.plan_title(&source, &title) else {
            panic!("expected a planned title");
        };
        assert_eq!(directive.output, "/out/Movie_01.mp4");
        assert_eq!(directive.audio.len(), 1);
        let audio = &directive.audio[0];
        assert_eq!(audio.tracks, vec![1]);
        assert_eq!(audio.encoder.as_deref(), Some("faac"));
        assert_eq!(audio.mixdown.as_deref(), Some("dpl2"));
        assert_eq!(audio.bitrate.as_deref(), Some("160"));
        assert_eq!(audio.name, "English (Dolby Pro Logic II)");
    }

    #[test]
    fn copy_and_mixdown_emit_two_directives() {
        let mut config = base_config("/out/#pos#.mkv");
        config.audio.copy = true;
        let mut p = planner(&config);
        let source = Source::new("/dev/sr0");
        let title = title_with_audio(1, "01:00:00");

        let TitleOutcome::Planned(directive) = p.plan_title(&source, &title) else {
            panic!("expected a planned title");
        };
        assert_eq!(directive.audio.len(), 2);
        assert_eq!(directive.audio[0].encoder.as_deref(), Some("copy"));
        assert_eq!(directive.audio[0].name, "English (AC3) (5.1 ch)");
        // mkv steers the mixdown encoder to lame
        assert_eq!(directive.audio[1].encoder.as_deref(), Some("lame"));
    }

    #[test]
    fn mapping_rule_copy_sentinel_forces_copy() {
        let mut config = base_config("/out/#pos#.mp4");
        config.audio.mixdown_mappings = vec![MixdownMapping {
            pattern: "AC3.*5\\.1".to_string(),
            mixdown: "copy".to_string(),
        }];
        let mut p = planner(&config);
        let source = Source::new("/dev/sr0");
        let title = title_with_audio(1, "01:00:00");

        let TitleOutcome::Planned(directive) = p.plan_title(&source, &title) else {
            panic!("expected a planned title");
        };
        assert_eq!(directive.audio.len(), 1);
        assert_eq!(directive.audio[0].encoder.as_deref(), Some("copy"));
    }

    #[test]
    fn preset_overrides_copy_and_mixdown() {
        let mut config = base_config("/out/#pos#.mp4");
        config.audio.copy = true;
        config.conversion.preset = Some("Universal".to_string());
        let presets = BTreeMap::from([(
            "Universal".to_string(),
            "-e x264 -q 20.0 -a 1,1 -E faac,copy:ac3 -B 160,160 -6 dpl2,auto -R Auto,Auto -D 0.0,0.0"
                .to_string(),
        )]);
        let mut p = Planner::new(
            &config,
            title_matcher(None),
            audio_matcher(None, false, false),
            subtitle_matcher(None, false, false),
            &presets,
        )
        .unwrap();
        let source = Source::new("/dev/sr0");
        let title = title_with_audio(3, "01:00:00");

        let TitleOutcome::Planned(directive) = p.plan_title(&source, &title) else {
            panic!("expected a planned title");
        };
        assert_eq!(directive.audio.len(), 1);
        assert_eq!(directive.audio[0].tracks, vec![3, 3]);
        assert_eq!(directive.audio[0].encoder.as_deref(), Some("faac,copy:ac3"));
        let cleaned = directive.preset_args.unwrap();
        assert!(cleaned.contains("-e x264"));
        assert!(!cleaned.contains("-E "));
    }

    #[test]
    fn missing_preset_falls_back_to_plain_path() {
        let mut config = base_config("/out/#pos#.mp4");
        config.conversion.preset = Some("NoSuchPreset".to_string());
        let mut p = planner(&config);
        let source = Source::new("/dev/sr0");
        let title = title_with_audio(1, "01:00:00");

        let TitleOutcome::Planned(directive) = p.plan_title(&source, &title) else {
            panic!("expected a planned title");
        };
        assert!(directive.preset_args.is_none());
        assert_eq!(directive.audio[0].mixdown.as_deref(), Some("dpl2"));
    }
}
