use clap::{CommandFactory, Parser};
mod commands;
mod logging;
use commands::cli;
use polsift_core::api::{load_config, AppConfig, CliError};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let mut args = cli::Args::parse();
    let Some(cmd) = args.command.take() else {
        cli::Args::command().print_help()?;
        return Ok(());
    };

    let cfg = load_config(args.config.as_deref())?;
    let guard = logging::init(&cfg.logging)?;

    let exit = dispatch(cmd, &cfg).await?;
    // Flush buffered log lines before a non-zero exit skips destructors.
    drop(guard);
    if exit != 0 {
        std::process::exit(exit);
    }
    Ok(())
}

async fn dispatch(cmd: cli::Commands, cfg: &AppConfig) -> Result<i32, CliError> {
    match cmd {
        cli::Commands::Triage(triage_args) => commands::triage::handle_triage(triage_args, cfg),
        cli::Commands::Clean(clean_args) => commands::clean::handle_clean(clean_args, cfg),
        cli::Commands::Check(check_args) => commands::check::handle_check(check_args, cfg).await,
        cli::Commands::Extract(extract_args) => {
            commands::extract::handle_extract(extract_args, cfg)
        }
    }
}
