mod common;
mod ui;
mod voiceover;

use clap::Parser;

use crate::ui::prelude::*;
use crate::voiceover::{ConfigSource, VoiceoverCommands, handle_voiceover_command};

/// voicesync main parser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Activate debug mode
    #[arg(short, long, global = true)]
    debug: bool,

    /// Output format for messages
    #[arg(long, value_enum, global = true, default_value = "text")]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(flatten)]
    source: ConfigSource,

    #[command(subcommand)]
    command: Option<VoiceoverCommands>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    ui::init(cli.output, !cli.no_color);
    ui::set_debug_mode(cli.debug);

    if cli.debug {
        emit(Level::Debug, "debug.enabled", "Debug mode is on", None);
    }

    let Some(command) = cli.command else {
        emit(
            Level::Info,
            "usage",
            "voicesync: run with --help for usage",
            None,
        );
        return;
    };

    if let Err(e) = handle_voiceover_command(command, &cli.source).await {
        let chain: Vec<String> = e.chain().map(|c| c.to_string()).collect();
        emit(
            Level::Error,
            "error",
            &format!("Error: {e:#}"),
            Some(serde_json::json!({ "chain": chain })),
        );
        std::process::exit(1);
    }
}
