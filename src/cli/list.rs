use anyhow::Result;
use clap::Args;
use tracing::debug;

use crate::lookup::{TheatreLookup, TheatreRecord};

/// List every theatre
#[derive(Args)]
pub struct ListCommand {
    /// Print the raw records as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListCommand {
    pub async fn execute(&self, lookup: &dyn TheatreLookup) -> Result<()> {
        let theatres = lookup.list_theatres().await?;
        debug!("Fetched {} theatres", theatres.len());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&theatres)?);
        } else {
            print!("{}", format_table(&theatres));
        }
        Ok(())
    }
}

/// One row per theatre with aligned columns
fn format_table(theatres: &[TheatreRecord]) -> String {
    let name_width = theatres
        .iter()
        .map(|t| t.name.chars().count())
        .chain(std::iter::once("NAME".len()))
        .max()
        .unwrap_or(0);
    let location_width = theatres
        .iter()
        .map(|t| t.location.chars().count())
        .chain(std::iter::once("LOCATION".len()))
        .max()
        .unwrap_or(0);

    let mut out = format!(
        "{:<4}  {:<name_width$}  {:<location_width$}  CAPACITY\n",
        "ID", "NAME", "LOCATION"
    );
    for theatre in theatres {
        let id = theatre.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<4}  {:<name_width$}  {:<location_width$}  {}\n",
            id, theatre.name, theatre.location, theatre.capacity
        ));
    }
    out
}
