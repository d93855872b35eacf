//! Gloam CLI - terminal client for the gloam dungeon server
//!
//! `gloam connect` joins a game; `gloam edit` previews a sprite file and
//! reloads it whenever it is saved.

use clap::{Parser, Subcommand};
use gloam_backend_terminal::ColorDepth;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

/// Gloam - terminal dungeon client
#[derive(Parser)]
#[command(name = "gloam")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log file; the terminal itself is used for drawing
    #[arg(long, default_value = "gloam.log")]
    log_file: PathBuf,

    /// Terminal colour support
    #[arg(long, value_enum, default_value = "auto")]
    colors: ColorChoice,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to a game server
    Connect {
        /// Server URL (ws://host:port/path), or host:port for line-framed TCP
        url: String,

        /// Sprite directory
        #[arg(short, long, default_value = gloam_world::DEFAULT_SPRITE_DIR)]
        sprites: PathBuf,

        /// Milliseconds between redraws
        #[arg(long, default_value = "100")]
        tick_ms: u64,
    },

    /// Live-edit a sprite file
    Edit {
        /// Sprite file to watch
        path: PathBuf,

        /// Milliseconds between redraws
        #[arg(long, default_value = "50")]
        frame_ms: u64,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum ColorChoice {
    /// Detect from the environment
    Auto,
    Mono,
    Basic,
    Extended,
    Truecolor,
}

impl ColorChoice {
    fn depth(self) -> ColorDepth {
        match self {
            Self::Auto => ColorDepth::detect(),
            Self::Mono => ColorDepth::Monochrome,
            Self::Basic => ColorDepth::Basic,
            Self::Extended => ColorDepth::Extended,
            Self::Truecolor => ColorDepth::TrueColor,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let log_file = File::create(&cli.log_file)?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let depth = cli.colors.depth();
    match cli.command {
        Commands::Connect {
            url,
            sprites,
            tick_ms,
        } => {
            commands::connect::run(&url, &sprites, tick_ms, depth).await?;
        }

        Commands::Edit { path, frame_ms } => {
            commands::edit::run(&path, frame_ms, depth).await?;
        }
    }

    Ok(())
}
