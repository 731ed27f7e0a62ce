mod cli;
mod processor;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ConvertOpts};
use std::collections::BTreeMap;
use std::path::Path;

use hbrip::{config, plan, select};
use hbrip_scan::{parse_preset_list, parse_scan_output, HandBrake, Source};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "hbrip=trace,hbrip_scan=trace".to_string()
        } else {
            "hbrip=info,hbrip_scan=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Scan {
            input,
            json,
            scan_file,
        } => scan_source(&input, json, scan_file.as_deref(), cli.config.as_deref()),
        Commands::Plan {
            input,
            json,
            scan_file,
            opts,
        } => plan_source(
            &input,
            json,
            scan_file.as_deref(),
            cli.config.as_deref(),
            &opts,
        ),
        Commands::Convert {
            input,
            scan_file,
            dry_run,
            opts,
        } => convert_source(
            &input,
            scan_file.as_deref(),
            cli.config.as_deref(),
            &opts,
            dry_run,
            cli.verbose,
        ),
        Commands::Presets => list_presets(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("hbrip {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Obtain scan text (live or cached) and parse it.
fn read_source(input: &Path, scan_file: Option<&Path>, config: &config::Config) -> Result<Source> {
    let text = match scan_file {
        // A readable scan file makes the tool itself unnecessary.
        Some(cache) if cache.is_file() => std::fs::read_to_string(cache)?,
        _ => {
            let hb = HandBrake::locate(config.tools.handbrake.as_deref())?;
            hb.scan_cached(input, scan_file)?
        }
    };
    Ok(parse_scan_output(input, &text))
}

fn scan_source(
    input: &Path,
    json: bool,
    scan_file: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let source = read_source(input, scan_file, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&source)?);
        return Ok(());
    }

    println!("{source}");
    if source.titles.is_empty() {
        println!("no titles found");
        return Ok(());
    }
    for title in &source.titles {
        println!("{title}");
        println!("  audio-tracks:");
        for track in &title.audio_tracks {
            println!("    {track}");
        }
        println!("  subtitles:");
        for subtitle in &title.subtitles {
            println!("    {subtitle}");
        }
        println!("  chapters:");
        for chapter in &title.chapters {
            println!("    {chapter}");
        }
    }
    Ok(())
}

fn plan_source(
    input: &Path,
    json: bool,
    scan_file: Option<&Path>,
    config_path: Option<&Path>,
    opts: &ConvertOpts,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    apply_overrides(&mut config, opts);

    let source = read_source(input, scan_file, &config)?;
    let presets = load_presets(&config)?;
    let mut planner = build_planner(&config, &presets)?;
    let plan = planner.plan_source(&source);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    if plan.directives.is_empty() && plan.skipped.is_empty() {
        println!("no titles found");
        return Ok(());
    }
    for directive in &plan.directives {
        println!("title {:02} -> {}", directive.title, directive.output);
        for audio in &directive.audio {
            println!(
                "  audio {:?}: {} ({}, {}, {})",
                audio.tracks,
                audio.name,
                audio.encoder.as_deref().unwrap_or("-"),
                audio.mixdown.as_deref().unwrap_or("-"),
                audio.bitrate.as_deref().unwrap_or("-"),
            );
        }
        if !directive.subtitles.is_empty() {
            println!("  subtitles: {:?}", directive.subtitles);
        }
        let args = plan::handbrake_args(directive, input, &config);
        println!("  command: HandBrakeCLI {}", args.join(" "));
    }
    for skipped in &plan.skipped {
        println!("title {:02} skipped: {}", skipped.title, skipped.reason);
    }
    Ok(())
}

fn convert_source(
    input: &Path,
    scan_file: Option<&Path>,
    config_path: Option<&Path>,
    opts: &ConvertOpts,
    dry_run: bool,
    verbose: bool,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    apply_overrides(&mut config, opts);

    let hb = HandBrake::locate(config.tools.handbrake.as_deref())?;
    let source = read_source(input, scan_file, &config)?;
    let presets = load_presets(&config)?;
    let mut planner = build_planner(&config, &presets)?;

    let created = processor::convert_source(&source, &config, &mut planner, &hb, dry_run, verbose)?;
    if source.titles.is_empty() {
        println!("no titles found");
    } else if dry_run {
        println!("dry run, nothing converted");
    } else {
        println!("{} file(s) created", created.len());
        for file in created {
            println!("  {}", file.display());
        }
    }
    Ok(())
}

fn list_presets(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let hb = HandBrake::locate(config.tools.handbrake.as_deref())?;
    let presets = parse_preset_list(&hb.preset_list()?);
    if presets.is_empty() {
        println!("no presets reported");
    }
    for (name, args) in presets {
        println!("{name}: {args}");
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!(
                "  Output template: {}",
                config.output.template.as_deref().unwrap_or("(none)")
            );
            println!(
                "  Audio languages: {:?}",
                config.selection.audio_languages.as_deref().unwrap_or(&[])
            );
            println!("  Mixdown mappings: {}", config.audio.mixdown_mappings.len());
            println!(
                "  Preset: {}",
                config.conversion.preset.as_deref().unwrap_or("(none)")
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Audio mixdown: {}", config.audio.mixdown);
            println!("  Mixdown bitrate: {}", config.audio.mixdown_bitrate);
        }
    }
    Ok(())
}

/// Build the three matchers and the planner from resolved configuration.
fn build_planner(
    config: &config::Config,
    presets: &BTreeMap<String, String>,
) -> Result<plan::Planner> {
    let titles = match &config.selection.titles {
        None => select::title_matcher(None),
        Some(specs) => select::title_matcher(Some(select::parse_position_list(specs)?)),
    };
    let audio = select::audio_matcher(
        config.selection.audio_languages.clone(),
        config.selection.skip_commentary,
        config.selection.only_first_per_language,
    );
    let subtitles = select::subtitle_matcher(
        config.selection.subtitle_languages.clone(),
        config.selection.skip_commentary,
        config.selection.only_first_per_language,
    );
    plan::Planner::new(config, titles, audio, subtitles, presets)
}

/// Fetch the preset catalog, but only when a preset is actually configured.
fn load_presets(config: &config::Config) -> Result<BTreeMap<String, String>> {
    if config.conversion.preset.is_none() {
        return Ok(BTreeMap::new());
    }
    let hb = HandBrake::locate(config.tools.handbrake.as_deref())?;
    Ok(parse_preset_list(&hb.preset_list()?))
}

fn apply_overrides(config: &mut config::Config, opts: &ConvertOpts) {
    if let Some(output) = &opts.output {
        config.output.template = Some(output.clone());
    }
    if opts.force {
        config.output.force = true;
    }
    if let Some(preset) = &opts.preset {
        config.conversion.preset = Some(preset.clone());
    }
    if opts.main_feature {
        config.selection.main_feature_only = true;
    }
    if let Some(titles) = &opts.titles {
        config.selection.titles = Some(titles.clone());
    }
    if let Some(audio) = &opts.audio {
        config.selection.audio_languages = Some(audio.clone());
    }
    if let Some(subtitles) = &opts.subtitles {
        config.selection.subtitle_languages = Some(subtitles.clone());
    }
    if let Some(min_length) = &opts.min_length {
        config.selection.min_length = Some(min_length.clone());
    }
    if let Some(max_length) = &opts.max_length {
        config.selection.max_length = Some(max_length.clone());
    }
    if opts.skip_duplicates {
        config.selection.skip_duplicates = true;
    }
    if opts.skip_commentary {
        config.selection.skip_commentary = true;
    }
    if opts.first_track_per_language {
        config.selection.only_first_per_language = true;
    }
    if let Some(preview) = &opts.preview {
        config.conversion.preview = Some(preview.clone());
    }
    if let Some(chapters) = &opts.chapters {
        config.conversion.chapters = Some(chapters.clone());
    }
    if let Some(extra_args) = &opts.extra_args {
        config.conversion.extra_args = Some(extra_args.clone());
    }
}
