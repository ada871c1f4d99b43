use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use spinrig_cli::config::Config;
use spinrig_cli::logging;

mod cli;
mod commands;
mod format;
mod style;

use cli::{Cli, Commands};
use commands::{SensorArgs, cmd_acquire, cmd_config, cmd_send, cmd_sensor};
use format::{FormatOptions, format_protocol};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "spinrig", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    // The dashboard owns the terminal, so its logs go to a file.
    #[cfg(feature = "tui")]
    let log_to_file = matches!(cli.command, Commands::Dashboard);
    #[cfg(not(feature = "tui"))]
    let log_to_file = false;

    if log_to_file {
        logging::init_file(cli.verbose, cli.quiet)?;
    } else {
        logging::init(cli.verbose, cli.quiet);
    }

    let config_path = Config::resolve_path(cli.config.as_deref());
    let config = Config::load_from(&config_path);
    let opts = FormatOptions::new(cli.no_color || config.no_color);
    tracing::debug!(path = %config_path.display(), "Loaded configuration");

    let ok = match cli.command {
        Commands::Slider { action, output } => {
            cmd_send(&config, action.into(), output.format, cli.quiet, &opts).await?
        }
        Commands::Belt { action, output } => {
            cmd_send(&config, action.into(), output.format, cli.quiet, &opts).await?
        }
        Commands::Sensor {
            output,
            watch,
            count,
            interval,
        } => {
            let args = SensorArgs {
                format: output.format,
                watch,
                count,
                interval,
            };
            cmd_sensor(&config, args, &opts).await?;
            true
        }
        Commands::Acquire { minutes, wait } => {
            cmd_acquire(&config, minutes, wait, cli.quiet, &opts).await?
        }
        #[cfg(feature = "tui")]
        Commands::Dashboard => {
            spinrig_cli::tui::run(config).await?;
            true
        }
        Commands::Protocol => {
            print!("{}", format_protocol(&opts));
            true
        }
        Commands::Config { action } => {
            cmd_config(action, &config_path, &config)?;
            true
        }
        Commands::Completions { .. } => {
            // Already handled above
            unreachable!()
        }
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
