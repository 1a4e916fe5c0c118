use anyhow::{Context, Result, bail};
use std::path::PathBuf;

use super::captions::{build_captions, render_srt};
use super::cli::{
    AlignArgs, CaptionsArgs, ConfigArgs, ConfigSource, GenerateArgs, PhrasesArgs, VoiceoverCommands,
};
use super::config::VoiceoverConfig;
use super::phrases::find_key_phrases;
use super::pipeline::{
    GenerateOptions, generate_voiceover, load_response, process_response, read_sidecar,
};
use super::report::{show_captions, show_phrases, show_summary};
use super::script::{KEY_PHRASES, SCRIPT};
use crate::common::fs::write_atomic;
use crate::common::paths::{CAPTIONS_FILE, sibling_of};
use crate::ui::prelude::*;

pub async fn handle_voiceover_command(
    command: VoiceoverCommands,
    source: &ConfigSource,
) -> Result<()> {
    match command {
        VoiceoverCommands::Generate(args) => handle_generate(args, source).await,
        VoiceoverCommands::Align(args) => handle_align(args, source),
        VoiceoverCommands::Phrases(args) => handle_phrases(args, source),
        VoiceoverCommands::Captions(args) => handle_captions(args, source),
        VoiceoverCommands::Script => handle_script(source),
        VoiceoverCommands::Config(args) => handle_config(args, source),
    }
}

fn load_config(source: &ConfigSource) -> Result<VoiceoverConfig> {
    let mut config = VoiceoverConfig::load(source.config.as_deref())?;
    if let Some(root) = &source.assets_root {
        config.assets_root = root.clone();
    }
    Ok(config)
}

async fn handle_generate(args: GenerateArgs, source: &ConfigSource) -> Result<()> {
    let mut config = load_config(source)?;
    if let Some(voice) = args.voice {
        config.voice_id = voice;
    }
    if let Some(model) = args.model {
        config.model = model;
    }
    config.validate()?;

    let api_key = config.resolve_api_key(args.api_key.as_deref())?;

    emit(
        Level::Info,
        "voiceover.generate.start",
        &format!("Generating voiceover with voice {}...", config.voice_id),
        Some(serde_json::json!({ "voice": config.voice_id, "model": config.model })),
    );
    emit(
        Level::Debug,
        "voiceover.generate.script",
        &format!("Script:\n{SCRIPT}"),
        None,
    );

    let output = generate_voiceover(GenerateOptions {
        script: SCRIPT,
        key_phrases: KEY_PHRASES,
        config: &config,
        api_key,
        save_response: args.save_response,
    })
    .await
    .context("Voiceover generation failed")?;

    show_summary(&output.alignment);
    show_phrases(&output.phrases);

    emit(
        Level::Success,
        "voiceover.generate.done",
        &format!(
            "\nDone. {} and {} are ready for the video timeline.",
            output.audio_path.display(),
            output.timestamps_path.display()
        ),
        Some(serde_json::json!({
            "audioPath": output.audio_path,
            "timestampsPath": output.timestamps_path,
            "totalDuration": output.total_duration,
        })),
    );
    Ok(())
}

fn handle_align(args: AlignArgs, source: &ConfigSource) -> Result<()> {
    let config = load_config(source)?;
    let response = load_response(&args.response)
        .with_context(|| format!("Failed to load synthesis response {}", args.response.display()))?;

    let output = process_response(
        SCRIPT,
        &response,
        &config.artifact_paths(),
        KEY_PHRASES,
        args.with_audio,
    )
    .context("Alignment failed")?;

    show_summary(&output.alignment);
    show_phrases(&output.phrases);
    Ok(())
}

fn timestamps_path(explicit: Option<PathBuf>, source: &ConfigSource) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(load_config(source)?
            .artifact_paths()
            .timestamps_file()
            .to_path_buf()),
    }
}

fn handle_phrases(args: PhrasesArgs, source: &ConfigSource) -> Result<()> {
    let path = timestamps_path(args.timestamps, source)?;
    let alignment = read_sidecar(&path)
        .with_context(|| format!("Failed to read timestamps {}", path.display()))?;

    let matches = if args.phrases.is_empty() {
        find_key_phrases(&alignment.words, KEY_PHRASES)
    } else {
        find_key_phrases(&alignment.words, args.phrases.as_slice())
    };

    show_phrases(&matches);
    Ok(())
}

fn handle_captions(args: CaptionsArgs, source: &ConfigSource) -> Result<()> {
    let path = timestamps_path(args.timestamps, source)?;
    let alignment = read_sidecar(&path)
        .with_context(|| format!("Failed to read timestamps {}", path.display()))?;

    let track = build_captions(&alignment)?;
    if track.unassigned_words > 0 {
        emit(
            Level::Warn,
            "voiceover.captions.unassigned",
            &format!(
                "{} timed word(s) did not belong to any script paragraph",
                track.unassigned_words
            ),
            None,
        );
    }

    show_captions(&track.windows);

    if args.dry_run {
        return Ok(());
    }

    let out_file = args
        .out_file
        .unwrap_or_else(|| sibling_of(&path, CAPTIONS_FILE));
    let json = serde_json::to_string_pretty(&track.windows).context("serializing captions")?;
    write_atomic(&out_file, json.as_bytes())
        .with_context(|| format!("Failed to write captions to {}", out_file.display()))?;
    emit(
        Level::Success,
        "voiceover.captions.saved",
        &format!("Captions saved to {}", out_file.display()),
        None,
    );

    if let Some(srt) = args.srt {
        write_atomic(&srt, render_srt(&track.windows).as_bytes())
            .with_context(|| format!("Failed to write subtitles to {}", srt.display()))?;
        emit(
            Level::Success,
            "voiceover.captions.srt",
            &format!("Subtitles saved to {}", srt.display()),
            None,
        );
    }

    Ok(())
}

fn handle_script(source: &ConfigSource) -> Result<()> {
    let config = load_config(source)?;
    match get_output_format() {
        OutputFormat::Json => emit(
            Level::Info,
            "voiceover.script",
            "Embedded narration script",
            Some(serde_json::json!({
                "script": SCRIPT,
                "voiceId": config.voice_id,
                "keyPhrases": KEY_PHRASES,
            })),
        ),
        OutputFormat::Text => {
            print_block(SCRIPT);
            separator(true);
            print_block(&format!("Voice: {}", config.voice_id));
            print_block(&format!("Key phrases: {}", KEY_PHRASES.join(", ")));
        }
    }
    Ok(())
}

fn handle_config(args: ConfigArgs, source: &ConfigSource) -> Result<()> {
    let path = match &source.config {
        Some(path) => path.clone(),
        None => VoiceoverConfig::default_path()?,
    };

    if args.init {
        if path.exists() && !args.force {
            bail!(
                "Config file {} already exists (use --force to overwrite)",
                path.display()
            );
        }
        // The file being replaced may not parse
        let mut config = VoiceoverConfig::default();
        if let Some(root) = &source.assets_root {
            config.assets_root = root.clone();
        }
        config.save_with_documentation(&path)?;
        emit(
            Level::Success,
            "voiceover.config.init",
            &format!("Wrote config to {}", path.display()),
            None,
        );
        return Ok(());
    }

    let config = load_config(source)?;
    let redacted = VoiceoverConfig {
        api_key: config.api_key.as_ref().map(|_| "********".to_string()),
        ..config
    };
    let rendered = toml::to_string_pretty(&redacted).context("serializing voiceover config")?;
    emit(
        Level::Info,
        "voiceover.config.path",
        &format!("Config file: {}", path.display()),
        Some(serde_json::json!({
            "path": path,
            "exists": path.exists(),
            "config": serde_json::to_value(&redacted).ok(),
        })),
    );
    print_block(&rendered);
    Ok(())
}
