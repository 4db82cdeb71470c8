use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::{list::ListCommand, show::ShowCommand};
use crate::config::Config;
use crate::lookup::{HttpTheatreLookup, TheatreId};
use crate::tui;

/// Marquee - browse theatre details from your terminal
#[derive(Parser)]
#[command(
    name = "marquee",
    version,
    about = "Browse theatre details from your terminal",
    long_about = r#"Marquee shows the theatres known to a theatre lookup service
and the details of the one you select.

Examples:
  marquee                                  # Start interactive mode
  marquee --theatre 3                      # Start with theatre 3 open
  marquee show 3                           # Print the details of theatre 3
  marquee --base-url http://host:5555 list # List theatres on another server"#
)]
pub struct Cli {
    /// Root URL of the theatre lookup service
    #[arg(short = 'u', long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Give up on a request after this long (e.g. "10s", "500ms")
    #[arg(long = "timeout", global = true, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    /// Theatre to open when the interactive UI starts
    #[arg(short = 't', long = "theatre")]
    pub theatre: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the details of one theatre
    Show(ShowCommand),

    /// List every theatre
    List(ListCommand),
}

impl Cli {
    /// Whether this invocation takes over the terminal
    pub fn is_interactive(&self) -> bool {
        self.command.is_none()
    }

    pub async fn execute(self, mut config: Config) -> Result<()> {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        config.validate()?;
        debug!("Configuration: {:?}", config);

        let request_timeout = self.timeout.or_else(|| config.request_timeout());
        let lookup = HttpTheatreLookup::new(config.base_url.clone())?.with_timeout(request_timeout);

        match self.command {
            Some(Commands::Show(show_cmd)) => show_cmd.execute(Arc::new(lookup)).await,
            Some(Commands::List(list_cmd)) => list_cmd.execute(&lookup).await,
            None => {
                info!("Starting interactive mode against {}", lookup.base_url());
                let source = lookup.base_url().to_string();
                let initial_theatre = self.theatre.map(TheatreId::new);

                tui::run(Arc::new(lookup), source, initial_theatre, config.tick_interval()).await?;

                info!("Application finished");
                Ok(())
            }
        }
    }
}
