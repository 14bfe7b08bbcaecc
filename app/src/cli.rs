//! Command-line flags.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "point-farmer")]
#[command(version, about = "Twitch Channel Point Farmer: watches your favourite channels while you're away")]
pub struct Cli {
    /// Skip the introduction and only ask what first time setup needs
    #[arg(long = "skip-intro", short = 's', alias = "skipintro")]
    pub skip_intro: bool,

    /// Directory holding config.json, .env, the streamer list, logs and cached images
    #[arg(long, env = "POINT_FARMER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Run a single reconciliation tick and exit
    #[arg(long)]
    pub once: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_intro_accepts_long_short_and_legacy_spelling() {
        for flag in ["--skip-intro", "-s", "--skipintro"] {
            let cli = Cli::try_parse_from(["point-farmer", flag]).unwrap();
            assert!(cli.skip_intro, "{flag} should set skip_intro");
        }
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["point-farmer"]).unwrap();
        assert!(!cli.skip_intro);
        assert!(!cli.once);
    }
}
