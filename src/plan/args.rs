//! HandBrakeCLI argument assembly.
//!
//! Turns one [`TitlePlan`] into the ordered argument vector the runner
//! executes. Audio directives become parallel comma-joined lists, indexed by
//! directive position. Preset and extra-argument text is whitespace-split;
//! values containing spaces do not survive that, a limitation inherited from
//! the preset text format itself.

use std::path::Path;

use super::{AudioDirective, Container, TitlePlan};
use crate::config::Config;

/// Build the full argument vector for one title's conversion.
pub fn handbrake_args(plan: &TitlePlan, input: &Path, config: &Config) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();

    args.push("--input".to_string());
    args.push(input.display().to_string());
    args.push("--output".to_string());
    args.push(plan.output.clone());

    if let Some(chapters) = &plan.chapters {
        args.push("--chapters".to_string());
        args.push(chapters.clone());
    }

    match &plan.preset_args {
        Some(preset_args) => {
            args.extend(preset_args.split_whitespace().map(String::from));
        }
        None => {
            args.extend(
                ["--encoder", "x264", "--quality", "20.0", "--decomb", "--detelecine"]
                    .map(String::from),
            );
            if !config.video.autocrop {
                args.extend(["--crop", "0:0:0:0"].map(String::from));
            }
            args.push("--loose-anamorphic".to_string());
        }
    }

    if let Some(width) = config.video.max_width {
        args.push("--maxWidth".to_string());
        args.push(width.to_string());
    }
    if let Some(height) = config.video.max_height {
        args.push("--maxHeight".to_string());
        args.push(height.to_string());
    }
    for (flag, value) in [
        ("--x264-profile", &config.video.x264_profile),
        ("--x264-preset", &config.video.x264_preset),
        ("--x264-tune", &config.video.x264_tune),
    ] {
        if let Some(value) = value {
            args.push(flag.to_string());
            args.push(value.clone());
        }
    }

    args.push("--format".to_string());
    args.push(plan.container.to_string());
    if plan.container == Container::Mp4 {
        args.push("--optimize".to_string());
    }
    args.push("--markers".to_string());

    if let Some(preview) = &plan.preview {
        args.push("--start-at".to_string());
        args.push(format!("duration:{}", preview.start));
        args.push("--stop-at".to_string());
        args.push(format!("duration:{}", preview.duration));
    }

    if !plan.audio.is_empty() {
        let tracks: Vec<String> = plan
            .audio
            .iter()
            .flat_map(|d| d.tracks.iter().map(u32::to_string))
            .collect();
        args.push("--audio".to_string());
        args.push(tracks.join(","));

        push_joined(&mut args, "--aencoder", &plan.audio, |d| d.encoder.clone());
        push_joined(&mut args, "--arate", &plan.audio, |d| d.rate.clone());
        push_joined(&mut args, "--mixdown", &plan.audio, |d| d.mixdown.clone());
        push_joined(&mut args, "--ab", &plan.audio, |d| d.bitrate.clone());
        push_joined(&mut args, "--drc", &plan.audio, |d| d.drc.clone());

        let names: Vec<String> = plan.audio.iter().map(|d| d.name.clone()).collect();
        args.push("--aname".to_string());
        args.push(names.join(","));

        args.push("--audio-fallback".to_string());
        args.push(plan.container.default_audio_encoder().to_string());
    }

    if !plan.subtitles.is_empty() {
        let subtitles: Vec<String> = plan.subtitles.iter().map(u32::to_string).collect();
        args.push("--subtitle".to_string());
        args.push(subtitles.join(","));
    }

    args.push("--title".to_string());
    args.push(plan.title.to_string());

    if let Some(extra) = &plan.extra_args {
        args.extend(extra.split_whitespace().map(String::from));
    }

    args
}

fn push_joined(
    args: &mut Vec<String>,
    flag: &str,
    directives: &[AudioDirective],
    value: fn(&AudioDirective) -> Option<String>,
) {
    let values: Vec<String> = directives.iter().filter_map(value).collect();
    if !values.is_empty() {
        args.push(flag.to_string());
        args.push(values.join(","));
    }
}
