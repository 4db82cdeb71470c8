//! Theatre details component
//!
//! Shows one theatre, fetched from the lookup service whenever the selected
//! identifier changes. Every request carries a generation number and the previous
//! request is aborted on change, so only the response to the latest selection is
//! ever applied.

use super::Component;
use crate::lookup::{LookupResult, TheatreId, TheatreLookup, TheatreRecord};
use crate::tui::{styles::Theme, Frame};
use anyhow::Result;
use async_trait::async_trait;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error};

/// Placeholder shown while no record is available for the selected theatre
pub const LOADING_TEXT: &str = "Loading...";

/// What the component currently knows about the selected theatre
#[derive(Debug, Clone, PartialEq)]
pub enum DetailsState {
    /// No theatre selected
    Idle,

    /// Waiting for the response to the current request
    Loading,

    /// The current request succeeded
    Loaded(TheatreRecord),

    /// The current request failed; holds a one-line summary of the error
    Failed(String),
}

#[derive(Debug)]
struct FetchOutcome {
    generation: u64,
    theatre_id: TheatreId,
    result: LookupResult<TheatreRecord>,
}

/// Renders the details of the theatre named by `theatre_id`
pub struct TheatreDetails {
    lookup: Arc<dyn TheatreLookup>,
    theatre_id: Option<TheatreId>,
    details: DetailsState,

    /// Summary of a failed refresh, shown under the record it left in place
    refresh_error: Option<String>,

    /// Bumped on every request and on deselection
    generation: u64,

    /// Generation whose outcome has not arrived yet
    pending: Option<u64>,

    in_flight: Option<JoinHandle<()>>,
    outcome_tx: mpsc::UnboundedSender<FetchOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<FetchOutcome>,
}

impl TheatreDetails {
    pub fn new(lookup: Arc<dyn TheatreLookup>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        Self {
            lookup,
            theatre_id: None,
            details: DetailsState::Idle,
            refresh_error: None,
            generation: 0,
            pending: None,
            in_flight: None,
            outcome_tx,
            outcome_rx,
        }
    }

    pub fn theatre_id(&self) -> Option<&TheatreId> {
        self.theatre_id.as_ref()
    }

    pub fn details(&self) -> &DetailsState {
        &self.details
    }

    /// Why the last refresh of a loaded record failed, if it did
    pub fn refresh_error(&self) -> Option<&str> {
        self.refresh_error.as_deref()
    }

    /// Whether a response for the current selection is still outstanding
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Select a theatre, or clear the selection with `None`.
    ///
    /// A new identifier cancels any outstanding request and issues exactly one
    /// fetch. Clearing the selection issues nothing. Re-selecting the current
    /// identifier is a no-op; use [`TheatreDetails::refresh`] to reload it.
    pub fn set_theatre_id(&mut self, theatre_id: Option<TheatreId>) {
        if self.theatre_id == theatre_id {
            return;
        }

        self.cancel_in_flight();
        self.generation += 1;
        self.theatre_id = theatre_id.clone();
        self.refresh_error = None;

        match theatre_id {
            Some(id) => {
                self.details = DetailsState::Loading;
                self.start_fetch(id);
            }
            None => {
                debug!("Theatre selection cleared");
                self.details = DetailsState::Idle;
                self.pending = None;
            }
        }
    }

    /// Request the current theatre again. A loaded record stays on screen until
    /// the new response arrives, and stays there if the reload fails.
    pub fn refresh(&mut self) {
        let Some(id) = self.theatre_id.clone() else {
            return;
        };

        self.cancel_in_flight();
        self.generation += 1;

        if !matches!(self.details, DetailsState::Loaded(_)) {
            self.details = DetailsState::Loading;
        }
        self.start_fetch(id);
    }

    /// Apply every outcome that has already arrived. Returns true if the
    /// displayed state changed.
    pub fn poll_outcomes(&mut self) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            changed |= self.apply(outcome);
        }
        changed
    }

    /// Wait until the response for the current selection has been applied
    pub async fn settle(&mut self) -> &DetailsState {
        while self.pending.is_some() {
            match self.outcome_rx.recv().await {
                Some(outcome) => {
                    self.apply(outcome);
                }
                None => break,
            }
        }
        &self.details
    }

    fn start_fetch(&mut self, id: TheatreId) {
        let generation = self.generation;
        let lookup = Arc::clone(&self.lookup);
        let outcome_tx = self.outcome_tx.clone();

        debug!("Fetching theatre {} (generation {})", id, generation);

        let handle = tokio::spawn(async move {
            let result = lookup.fetch_theatre(&id).await;
            // The receiver lives as long as the component
            let _ = outcome_tx.send(FetchOutcome {
                generation,
                theatre_id: id,
                result,
            });
        });

        self.in_flight = Some(handle);
        self.pending = Some(generation);
    }

    fn cancel_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }

    fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.generation != self.generation {
            debug!(
                "Dropping stale response for theatre {} (generation {}, current {})",
                outcome.theatre_id, outcome.generation, self.generation
            );
            return false;
        }

        self.pending = None;
        self.in_flight = None;

        match outcome.result {
            Ok(record) => {
                debug!("Loaded theatre {}: {}", outcome.theatre_id, record.name);
                self.details = DetailsState::Loaded(record);
                self.refresh_error = None;
            }
            Err(e) => {
                error!(
                    "Error fetching theatre details for {}: {}",
                    outcome.theatre_id, e
                );
                // A current-generation Loaded record can only belong to this id
                if matches!(self.details, DetailsState::Loaded(_)) {
                    self.refresh_error = Some(e.summary());
                } else {
                    self.details = DetailsState::Failed(e.summary());
                }
            }
        }
        true
    }

    /// Lines to display for the current state, empty when nothing is selected
    pub fn lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        if self.theatre_id.is_none() {
            return Vec::new();
        }

        match &self.details {
            DetailsState::Idle => Vec::new(),
            DetailsState::Loading => {
                vec![Line::from(Span::styled(LOADING_TEXT, theme.placeholder_style()))]
            }
            DetailsState::Loaded(record) => {
                let mut lines = record_lines(record, theme);
                if let Some(summary) = &self.refresh_error {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled(
                        format!("Error refreshing theatre details: {}", summary),
                        theme.error_style(),
                    )));
                }
                lines
            }
            DetailsState::Failed(summary) => vec![
                Line::from(Span::styled(LOADING_TEXT, theme.placeholder_style())),
                Line::from(Span::styled(
                    format!("Error fetching theatre details: {}", summary),
                    theme.error_style(),
                )),
            ],
        }
    }

    /// The rendering as plain text, one line per row
    pub fn plain_text(&self) -> String {
        self.lines(&Theme::default())
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn record_lines(record: &TheatreRecord, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(record.name.clone(), theme.heading_style())),
        Line::from(""),
        Line::from(Span::styled(
            format!("Location: {}", record.location),
            theme.text_style(),
        )),
        Line::from(Span::styled(
            format!("Capacity: {}", record.capacity),
            theme.text_style(),
        )),
    ];

    let showtimes = record.showtimes();
    if !showtimes.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Showtimes: {}", showtimes.join(", ")),
            theme.dim_style(),
        )));
    }

    let screens = record.screens();
    if !screens.is_empty() {
        let screens = screens
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(Line::from(Span::styled(
            format!("Screens: {}", screens),
            theme.dim_style(),
        )));
    }

    lines
}

impl Drop for TheatreDetails {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}

#[async_trait]
impl Component for TheatreDetails {
    async fn tick(&mut self) -> Result<()> {
        self.poll_outcomes();
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let lines = self.lines(theme);
        if lines.is_empty() {
            return;
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::testing::{unavailable, GatedLookup};
    use crate::lookup::HttpTheatreLookup;
    use ratatui::{backend::TestBackend, buffer::Buffer, style::Modifier, Terminal};
    use serde_json::json;
    use std::io;
    use std::sync::Mutex;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn grand() -> TheatreRecord {
        TheatreRecord::new("Grand", "Downtown", 200)
    }

    fn details_with(lookup: &Arc<GatedLookup>) -> TheatreDetails {
        TheatreDetails::new(Arc::clone(lookup) as Arc<dyn TheatreLookup>)
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn screen_rows(buffer: &Buffer) -> Vec<String> {
        let area = buffer.area;
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buffer.get(x, y).symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    fn draw(terminal: &mut Terminal<TestBackend>, details: &mut TheatreDetails) -> Vec<String> {
        let theme = Theme::default();
        terminal
            .draw(|frame| {
                let area = frame.size();
                details.render(frame, area, &theme)
            })
            .unwrap();
        screen_rows(terminal.backend().buffer())
    }

    /// Collects formatted log output so tests can look for diagnostics
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_new_component_is_idle() {
        let lookup = Arc::new(GatedLookup::new());
        let details = details_with(&lookup);

        assert_eq!(details.details(), &DetailsState::Idle);
        assert!(details.theatre_id().is_none());
        assert!(!details.is_pending());
        assert_eq!(details.plain_text(), "");
    }

    #[tokio::test]
    async fn test_null_identifier_issues_no_request() {
        let lookup = Arc::new(GatedLookup::new());
        let mut details = details_with(&lookup);

        details.set_theatre_id(None);
        details.settle().await;
        tokio::task::yield_now().await;

        assert!(details.lines(&Theme::default()).is_empty());
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test]
    async fn test_loading_until_response_arrives() {
        let lookup = Arc::new(GatedLookup::new());
        let gate = lookup.gate("t1");
        let mut details = details_with(&lookup);

        details.set_theatre_id(Some(TheatreId::from("t1")));
        assert_eq!(details.plain_text(), "Loading...");
        assert!(details.is_pending());

        tokio::task::yield_now().await;
        assert!(!details.poll_outcomes());
        assert_eq!(details.plain_text(), "Loading...");

        gate.send(Ok(grand())).unwrap();
        assert_eq!(details.settle().await, &DetailsState::Loaded(grand()));
        assert_eq!(lookup.calls(), vec![TheatreId::from("t1")]);
    }

    #[tokio::test]
    async fn test_loaded_record_lines() {
        let lookup = Arc::new(GatedLookup::new());
        let gate = lookup.gate("t1");
        let mut details = details_with(&lookup);

        details.set_theatre_id(Some(TheatreId::from("t1")));
        gate.send(Ok(grand())).unwrap();
        details.settle().await;

        let lines = details.lines(&Theme::default());
        assert_eq!(line_text(&lines[0]), "Grand");
        assert!(lines[0].spans[0]
            .style
            .add_modifier
            .contains(Modifier::BOLD));
        assert!(lines.iter().any(|l| line_text(l).contains("Downtown")));
        assert!(lines.iter().any(|l| line_text(l).contains("200")));
        assert!(!details.plain_text().contains("Showtimes"));
    }

    #[tokio::test]
    async fn test_loaded_record_with_tickets() {
        let lookup = Arc::new(GatedLookup::new());
        let gate = lookup.gate("7");
        let mut details = details_with(&lookup);

        let mut record = TheatreRecord::new("Prestige Cinema", "Westgate mall", 90);
        record.ticket_showtimes = vec!["18:00".into(), "21:30".into(), "18:00".into()];
        record.ticket_screens = vec![3, 1];

        details.set_theatre_id(Some(TheatreId::from("7")));
        gate.send(Ok(record)).unwrap();
        details.settle().await;

        let text = details.plain_text();
        assert!(text.contains("Showtimes: 18:00, 21:30"));
        assert!(text.contains("Screens: 1, 3"));
    }

    #[tokio::test]
    async fn test_failed_fetch_logs_and_keeps_placeholder() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let lookup = Arc::new(GatedLookup::new());
        let mut details = details_with(&lookup);

        details.set_theatre_id(Some(TheatreId::from("t2")));
        let state = details.settle().await.clone();

        assert_eq!(state, DetailsState::Failed(unavailable().summary()));
        let text = details.plain_text();
        assert!(text.starts_with("Loading..."));
        assert!(text.contains("connection reset"));
        assert!(logs.contents().contains("Error fetching theatre details for t2"));
    }

    #[tokio::test]
    async fn test_same_identifier_is_not_refetched() {
        let lookup = Arc::new(GatedLookup::new());
        let gate = lookup.gate("t1");
        let mut details = details_with(&lookup);

        details.set_theatre_id(Some(TheatreId::from("t1")));
        details.set_theatre_id(Some(TheatreId::from("t1")));
        gate.send(Ok(grand())).unwrap();
        details.settle().await;

        assert_eq!(lookup.calls(), vec![TheatreId::from("t1")]);
    }

    #[tokio::test]
    async fn test_latest_selection_wins_when_earlier_resolves_last() {
        let lookup = Arc::new(GatedLookup::new());
        let gate_t1 = lookup.gate("t1");
        let gate_t2 = lookup.gate("t2");
        let mut details = details_with(&lookup);

        details.set_theatre_id(Some(TheatreId::from("t1")));
        tokio::task::yield_now().await;
        details.set_theatre_id(Some(TheatreId::from("t2")));

        let second = TheatreRecord::new("Mega Cinema", "Junction mall", 60);
        gate_t2.send(Ok(second.clone())).unwrap();
        details.settle().await;

        // The t1 request was aborted; a late answer has nowhere to go
        let _ = gate_t1.send(Ok(grand()));
        tokio::task::yield_now().await;
        details.poll_outcomes();

        assert_eq!(details.details(), &DetailsState::Loaded(second));
    }

    #[tokio::test]
    async fn test_stale_outcome_is_dropped() {
        let lookup = Arc::new(GatedLookup::new());
        let _gate_t1 = lookup.gate("t1");
        let _gate_t2 = lookup.gate("t2");
        let mut details = details_with(&lookup);

        details.set_theatre_id(Some(TheatreId::from("t1")));
        let first_generation = details.generation;
        details.set_theatre_id(Some(TheatreId::from("t2")));

        // t1's answer was already queued before the selection changed
        let applied = details.apply(FetchOutcome {
            generation: first_generation,
            theatre_id: TheatreId::from("t1"),
            result: Ok(grand()),
        });

        assert!(!applied);
        assert_eq!(details.details(), &DetailsState::Loading);
        assert!(details.is_pending());
    }

    #[tokio::test]
    async fn test_clearing_selection_drops_inflight_response() {
        let lookup = Arc::new(GatedLookup::new());
        let gate = lookup.gate("t1");
        let mut details = details_with(&lookup);

        details.set_theatre_id(Some(TheatreId::from("t1")));
        details.set_theatre_id(None);
        let _ = gate.send(Ok(grand()));
        tokio::task::yield_now().await;
        details.poll_outcomes();

        assert_eq!(details.details(), &DetailsState::Idle);
        assert_eq!(details.plain_text(), "");
    }

    #[tokio::test]
    async fn test_refresh_keeps_record_until_reload() {
        let lookup = Arc::new(GatedLookup::new());
        let gate = lookup.gate("t1");
        let mut details = details_with(&lookup);

        details.set_theatre_id(Some(TheatreId::from("t1")));
        gate.send(Ok(grand())).unwrap();
        details.settle().await;

        let gate = lookup.gate("t1");
        details.refresh();
        assert!(details.is_pending());
        assert_eq!(details.details(), &DetailsState::Loaded(grand()));

        let renamed = TheatreRecord::new("Grand Deluxe", "Downtown", 220);
        gate.send(Ok(renamed.clone())).unwrap();
        details.settle().await;

        assert_eq!(details.details(), &DetailsState::Loaded(renamed));
        assert_eq!(lookup.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_loaded_record() {
        let lookup = Arc::new(GatedLookup::new());
        let gate = lookup.gate("t1");
        let mut details = details_with(&lookup);

        details.set_theatre_id(Some(TheatreId::from("t1")));
        gate.send(Ok(grand())).unwrap();
        details.settle().await;

        // No gate for the second request, so it fails
        details.refresh();
        details.settle().await;

        assert_eq!(details.details(), &DetailsState::Loaded(grand()));
        assert_eq!(details.refresh_error(), Some(unavailable().summary().as_str()));
        let text = details.plain_text();
        assert!(text.starts_with("Grand\n\nLocation: Downtown\nCapacity: 200"));
        assert!(!text.contains("Loading..."));
        assert!(text.contains("Error refreshing theatre details: connection reset"));

        let gate = lookup.gate("t1");
        details.refresh();
        gate.send(Ok(grand())).unwrap();
        details.settle().await;

        assert!(details.refresh_error().is_none());
        assert_eq!(details.plain_text(), "Grand\n\nLocation: Downtown\nCapacity: 200");
    }

    #[tokio::test]
    async fn test_switching_from_loaded_theatre_shows_only_new_one() {
        let lookup = Arc::new(GatedLookup::new());
        let gate_t1 = lookup.gate("t1");
        let gate_t2 = lookup.gate("t2");
        let mut details = details_with(&lookup);

        details.set_theatre_id(Some(TheatreId::from("t1")));
        gate_t1.send(Ok(grand())).unwrap();
        details.settle().await;
        assert!(details.plain_text().starts_with("Grand"));

        details.set_theatre_id(Some(TheatreId::from("t2")));
        assert_eq!(details.details(), &DetailsState::Loading);
        assert_eq!(details.plain_text(), "Loading...");

        tokio::task::yield_now().await;
        details.poll_outcomes();
        assert_eq!(details.plain_text(), "Loading...");

        let second = TheatreRecord::new("Mega Cinema", "Junction mall", 60);
        gate_t2.send(Ok(second.clone())).unwrap();
        details.settle().await;

        assert_eq!(details.details(), &DetailsState::Loaded(second));
        assert_eq!(
            details.plain_text(),
            "Mega Cinema\n\nLocation: Junction mall\nCapacity: 60"
        );
        assert!(!details.plain_text().contains("Grand"));
        assert_eq!(
            lookup.calls(),
            vec![TheatreId::from("t1"), TheatreId::from("t2")]
        );
    }

    #[tokio::test]
    async fn test_refresh_without_selection_does_nothing() {
        let lookup = Arc::new(GatedLookup::new());
        let mut details = details_with(&lookup);

        details.refresh();
        tokio::task::yield_now().await;

        assert!(!details.is_pending());
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test]
    async fn test_exactly_one_request_against_service() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/theaters/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Grand",
                "location": "Downtown",
                "capacity": 200
            })))
            .expect(1)
            .mount(&server)
            .await;

        let lookup = HttpTheatreLookup::new(server.uri()).unwrap();
        let mut details = TheatreDetails::new(Arc::new(lookup));

        details.set_theatre_id(None);
        details.set_theatre_id(Some(TheatreId::from("t1")));
        details.settle().await;

        assert_eq!(
            details.plain_text(),
            "Grand\n\nLocation: Downtown\nCapacity: 200"
        );
    }

    #[tokio::test]
    async fn test_network_failure_against_service() {
        let lookup = HttpTheatreLookup::new("http://127.0.0.1:9").unwrap();
        let mut details = TheatreDetails::new(Arc::new(lookup));

        details.set_theatre_id(Some(TheatreId::from("t2")));
        let state = details.settle().await;

        assert!(matches!(state, DetailsState::Failed(_)));
        assert!(details.plain_text().starts_with("Loading..."));
    }

    #[tokio::test]
    async fn test_render_every_state() {
        let lookup = Arc::new(GatedLookup::new());
        let gate = lookup.gate("t1");
        let mut details = details_with(&lookup);
        let mut terminal = Terminal::new(TestBackend::new(24, 4)).unwrap();

        let rows = draw(&mut terminal, &mut details);
        assert!(rows.iter().all(|row| row.is_empty()));

        details.set_theatre_id(Some(TheatreId::from("t1")));
        let rows = draw(&mut terminal, &mut details);
        assert_eq!(rows, vec!["Loading...", "", "", ""]);

        gate.send(Ok(grand())).unwrap();
        details.settle().await;
        let rows = draw(&mut terminal, &mut details);
        assert_eq!(
            rows,
            vec!["Grand", "", "Location: Downtown", "Capacity: 200"]
        );
    }
}
