//! In-memory lookup used by component and page tests

use super::{LookupError, LookupResult, TheatreId, TheatreLookup, TheatreRecord};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;

type Gate = oneshot::Receiver<LookupResult<TheatreRecord>>;

/// Lookup whose responses are released by the test through a oneshot gate.
/// Identifiers without a gate fail immediately.
#[derive(Default)]
pub struct GatedLookup {
    gates: Mutex<HashMap<TheatreId, Gate>>,
    calls: Mutex<Vec<TheatreId>>,
    theatres: Mutex<Vec<TheatreRecord>>,
}

impl GatedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theatres(theatres: Vec<TheatreRecord>) -> Self {
        let lookup = Self::new();
        *lookup.theatres.lock().unwrap() = theatres;
        lookup
    }

    /// Hold the next request for `id` until the returned sender fires
    pub fn gate(&self, id: &str) -> oneshot::Sender<LookupResult<TheatreRecord>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(TheatreId::from(id), rx);
        tx
    }

    /// Identifiers requested so far, in order
    pub fn calls(&self) -> Vec<TheatreId> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn unavailable() -> LookupError {
    LookupError::StatusError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        message: "connection reset".to_string(),
    }
}

#[async_trait]
impl TheatreLookup for GatedLookup {
    async fn fetch_theatre(&self, id: &TheatreId) -> LookupResult<TheatreRecord> {
        self.calls.lock().unwrap().push(id.clone());
        let gate = self.gates.lock().unwrap().remove(id);

        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(unavailable())),
            None => Err(unavailable()),
        }
    }

    async fn list_theatres(&self) -> LookupResult<Vec<TheatreRecord>> {
        Ok(self.theatres.lock().unwrap().clone())
    }
}
