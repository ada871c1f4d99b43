//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use spinrig_types::{BeltCommand, RigCommand, SliderCommand};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Reusable output format arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Parser)]
#[command(name = "spinrig")]
#[command(author, version, about = "Control panel for the spinrig electrospinning rig", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "SPINRIG_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Drive the syringe-pump slider
    Slider {
        #[command(subcommand)]
        action: SliderAction,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Drive the stepper-motor belt
    Belt {
        #[command(subcommand)]
        action: BeltAction,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Read temperature and humidity
    Sensor {
        #[command(flatten)]
        output: OutputArgs,

        /// Keep reading until interrupted
        #[arg(short, long)]
        watch: bool,

        /// Number of readings to take before exiting (0 for unlimited)
        #[arg(short = 'n', long, default_value = "0", requires = "watch")]
        count: u32,

        /// Seconds between readings (defaults to the configured poll interval)
        #[arg(short, long, requires = "watch")]
        interval: Option<u64>,
    },

    /// Run a timed acquisition on both actuators without the dashboard
    Acquire {
        /// Acquisition length in minutes (defaults to the configured preset)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=60))]
        minutes: Option<u32>,

        /// Seconds to wait for humidity to come into band (0 waits forever)
        #[arg(short, long, default_value = "120")]
        wait: u64,
    },

    /// Launch the terminal control panel
    #[cfg(feature = "tui")]
    Dashboard,

    /// Show the sample preparation reminders
    Protocol,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Slider subcommands
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum SliderAction {
    /// Raise the slider
    Up,
    /// Lower the slider
    Down,
    /// Halt the slider
    Stop,
    /// Run the pump for a number of minutes
    Timer {
        #[arg(value_parser = clap::value_parser!(u32).range(1..=60))]
        minutes: u32,
    },
}

impl From<SliderAction> for RigCommand {
    fn from(action: SliderAction) -> Self {
        let command = match action {
            SliderAction::Up => SliderCommand::Up,
            SliderAction::Down => SliderCommand::Down,
            SliderAction::Stop => SliderCommand::Stop,
            SliderAction::Timer { minutes } => SliderCommand::StartTimer(minutes),
        };
        command.into()
    }
}

/// Belt subcommands
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum BeltAction {
    /// Set the stepper speed
    Speed {
        #[arg(value_parser = clap::value_parser!(u32).range(10..=1001))]
        value: u32,
    },
    /// Set the step size
    Step {
        #[arg(value_parser = clap::value_parser!(u32).range(10..=2050))]
        value: u32,
    },
    /// Move the belt left
    Left,
    /// Move the belt right
    Right,
    /// Run the belt for a number of minutes
    Timer {
        #[arg(value_parser = clap::value_parser!(u32).range(1..=60))]
        minutes: u32,
    },
}

impl From<BeltAction> for RigCommand {
    fn from(action: BeltAction) -> Self {
        let command = match action {
            BeltAction::Speed { value } => BeltCommand::SetSpeed(value),
            BeltAction::Step { value } => BeltCommand::SetStep(value),
            BeltAction::Left => BeltCommand::Left,
            BeltAction::Right => BeltCommand::Right,
            BeltAction::Timer { minutes } => BeltCommand::StartTimer(minutes),
        };
        command.into()
    }
}

/// Config subcommands
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Print the config file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write the stock configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
