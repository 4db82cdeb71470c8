use anyhow::{anyhow, Result};
use clap::Args;
use std::sync::Arc;
use tracing::debug;

use crate::lookup::{TheatreId, TheatreLookup};
use crate::tui::{DetailsState, TheatreDetails};

/// Print the details of one theatre
#[derive(Args)]
pub struct ShowCommand {
    /// Identifier of the theatre to show
    pub theatre_id: String,
}

impl ShowCommand {
    pub async fn execute(&self, lookup: Arc<dyn TheatreLookup>) -> Result<()> {
        debug!("Showing theatre {}", self.theatre_id);

        let mut details = TheatreDetails::new(lookup);
        details.set_theatre_id(Some(TheatreId::new(self.theatre_id.clone())));
        details.settle().await;

        println!("{}", self.output(&details)?);
        Ok(())
    }

    /// Text to print for a settled component; a failed fetch prints nothing
    fn output(&self, details: &TheatreDetails) -> Result<String> {
        match details.details() {
            DetailsState::Failed(summary) => Err(anyhow!(
                "Could not load theatre {}: {}",
                self.theatre_id,
                summary
            )),
            _ => Ok(details.plain_text()),
        }
    }
}
