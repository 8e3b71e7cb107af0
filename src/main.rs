use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use pitchsh::app::{InputMode, run_monitor};
use pitchsh::cli::{Cli, Commands, ConfigAction};
use pitchsh::config::Config;
use pitchsh::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    log::debug!("pitchsh {}", pitchsh::version_string());

    match &cli.command {
        None => {
            let config = effective_config(&cli)?;
            run_monitor(config, InputMode::detect(), cli.quiet).await?;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, &cli)?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "pitchsh",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// File, then environment, then command-line flags.
fn effective_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::resolve(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_env_overrides();
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

fn handle_config_command(action: &ConfigAction, cli: &Cli) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => Config::default_path()?,
            };
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let config = effective_config(cli)?;
            print!("{}", config.to_toml()?);
        }
    }
    Ok(())
}
