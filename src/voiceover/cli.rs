use clap::{Args, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Subcommand, Debug, Clone)]
pub enum VoiceoverCommands {
    /// Synthesize the narration and write audio plus word timestamps
    Generate(GenerateArgs),
    /// Rebuild timestamps from a saved synthesis response (no API call)
    Align(AlignArgs),
    /// Look up key phrases in an existing timestamps file
    Phrases(PhrasesArgs),
    /// Derive caption frame windows from an existing timestamps file
    Captions(CaptionsArgs),
    /// Print the embedded narration script and key phrases
    Script,
    /// Show the resolved configuration
    Config(ConfigArgs),
}

/// Options shared by commands that read the config file
#[derive(Args, Debug, Clone)]
pub struct ConfigSource {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Override the assets root (audio is written to <root>/audio)
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub assets_root: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// API key (defaults to ELEVENLABS_API_KEY, then the config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Override the voice id
    #[arg(long)]
    pub voice: Option<String>,

    /// Override the synthesis model
    #[arg(long)]
    pub model: Option<String>,

    /// Keep the raw service response next to the timestamps
    #[arg(long)]
    pub save_response: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AlignArgs {
    /// Saved synthesis response (JSON)
    #[arg(value_hint = ValueHint::FilePath)]
    pub response: PathBuf,

    /// Also decode and write the audio payload
    #[arg(long)]
    pub with_audio: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PhrasesArgs {
    /// Timestamps file; defaults to <assets_root>/audio/timestamps.json
    #[arg(value_hint = ValueHint::FilePath)]
    pub timestamps: Option<PathBuf>,

    /// Phrase to look up (repeatable); defaults to the built-in key phrases
    #[arg(short = 'p', long = "phrase")]
    pub phrases: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CaptionsArgs {
    /// Timestamps file; defaults to <assets_root>/audio/timestamps.json
    #[arg(value_hint = ValueHint::FilePath)]
    pub timestamps: Option<PathBuf>,

    /// Output path for caption windows; defaults to captions.json next to the timestamps
    #[arg(short = 'o', long = "out-file", value_hint = ValueHint::FilePath)]
    pub out_file: Option<PathBuf>,

    /// Also write an SRT subtitle file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub srt: Option<PathBuf>,

    /// Print the windows without writing any file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Write a documented config file with the current values
    #[arg(long)]
    pub init: bool,

    /// Overwrite an existing config file with --init
    #[arg(long)]
    pub force: bool,
}
