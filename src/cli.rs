use clap::{Parser, Subcommand};

use crate::download::job::MediaMode;

#[derive(Parser)]
#[command(name = "linkdrop")]
#[command(author, version, about = "Telegram bot that downloads videos and audio from links", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Download a single link from the command line
    Download {
        /// URL to download
        url: String,

        /// What to produce: video or audio
        #[arg(short, long, default_value = "video")]
        mode: MediaMode,

        /// Directory the finished file is copied to
        #[arg(short, long, default_value = ".")]
        output: String,
    },

    /// Print the installed yt-dlp version
    CheckYtdlp,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
