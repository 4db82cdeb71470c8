//! Client side of the theatre lookup service

mod client;
mod errors;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::HttpTheatreLookup;
pub use errors::{LookupError, LookupResult};
pub use types::{TheatreId, TheatreRecord};

use async_trait::async_trait;

/// Read access to theatre records
#[async_trait]
pub trait TheatreLookup: Send + Sync {
    /// Fetch a single theatre by identifier
    async fn fetch_theatre(&self, id: &TheatreId) -> LookupResult<TheatreRecord>;

    /// Fetch every theatre the service knows about
    async fn list_theatres(&self) -> LookupResult<Vec<TheatreRecord>>;
}
