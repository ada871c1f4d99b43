use std::path::PathBuf;

use anyhow::Result;

use spinrig_cli::config::{CONFIG_ENV, Config};
use spinrig_cli::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to a file; the terminal belongs to the panel.
    logging::init_file(false, false)?;

    let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let config = Config::load_from(&Config::resolve_path(explicit.as_deref()));

    spinrig_cli::tui::run(config).await
}
