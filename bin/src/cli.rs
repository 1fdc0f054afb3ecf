use clap::{Args, Parser, Subcommand};
use inscroll::Platform;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "inscroll", version, about = "Keyboard-aware autoscroll coordinator")]
pub struct Cli {
    /// Log file path
    #[arg(long, global = true, env = "INSCROLL_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Feed a recorded session through the coordinator and print every effect
    Replay(ReplayArgs),
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Session file, a TOML list of `[[step]]` entries
    pub session: PathBuf,

    /// Platform profile; overrides the options file
    #[arg(long)]
    pub platform: Option<Platform>,

    /// Options file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_replay_flags() {
        let cli = Cli::try_parse_from([
            "inscroll",
            "replay",
            "session.toml",
            "--platform",
            "android",
            "--config",
            "inscroll.toml",
            "--log-file",
            "replay.log",
        ])
        .unwrap();

        assert_eq!(cli.log_file, Some(PathBuf::from("replay.log")));
        let Command::Replay(args) = cli.command;
        assert_eq!(args.session, PathBuf::from("session.toml"));
        assert_eq!(args.platform, Some(Platform::Android));
        assert_eq!(args.config, Some(PathBuf::from("inscroll.toml")));
    }

    #[test]
    fn rejects_unknown_platform() {
        assert!(Cli::try_parse_from(["inscroll", "replay", "s.toml", "--platform", "web"]).is_err());
    }
}
