use clap::Parser;
use inscroll_bin::{
    cli::{Cli, Command},
    commands,
};
use inscroll_log::LogConfig;

fn main() {
    let cli = Cli::parse();

    let _log_guard = match inscroll_log::init(LogConfig {
        log_file_path: cli.log_file.clone(),
    }) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {e}");
            None
        },
    };

    let result = match cli.command {
        Command::Replay(args) => commands::replay::handle(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
