use super::{Page, PageId};
use crate::lookup::{LookupResult, TheatreId, TheatreLookup, TheatreRecord};
use crate::tui::{
    components::{Component, DetailsState, TheatreDetails},
    keys::KeyMap,
    styles::Theme,
    Frame,
};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Theatre list as known to the page
#[derive(Debug, Clone, PartialEq)]
enum Listing {
    Loading,
    Loaded(Vec<TheatreRecord>),
    Failed(String),
}

/// Lists every theatre and shows the selected one in a details pane
pub struct TheatresPage {
    id: PageId,
    title: String,
    lookup: Arc<dyn TheatreLookup>,
    keys: KeyMap,
    listing: Listing,
    list_state: ListState,
    list_rx: Option<oneshot::Receiver<LookupResult<Vec<TheatreRecord>>>>,
    details: TheatreDetails,
    initial_theatre: Option<TheatreId>,
}

impl TheatresPage {
    pub fn new(lookup: Arc<dyn TheatreLookup>, keys: KeyMap) -> Self {
        Self {
            id: "theatres".to_string(),
            title: "Theatres".to_string(),
            details: TheatreDetails::new(Arc::clone(&lookup)),
            lookup,
            keys,
            listing: Listing::Loading,
            list_state: ListState::default(),
            list_rx: None,
            initial_theatre: None,
        }
    }

    /// Open the details pane on `theatre_id` when the page is entered
    pub fn with_initial_theatre(mut self, theatre_id: Option<TheatreId>) -> Self {
        self.initial_theatre = theatre_id;
        self
    }

    #[cfg(test)]
    pub fn details(&self) -> &TheatreDetails {
        &self.details
    }

    #[cfg(test)]
    pub fn details_mut(&mut self) -> &mut TheatreDetails {
        &mut self.details
    }

    fn theatres(&self) -> &[TheatreRecord] {
        match &self.listing {
            Listing::Loaded(theatres) => theatres,
            _ => &[],
        }
    }

    fn reload_list(&mut self) {
        let (tx, rx) = oneshot::channel();
        let lookup = Arc::clone(&self.lookup);

        tokio::spawn(async move {
            let _ = tx.send(lookup.list_theatres().await);
        });

        self.listing = Listing::Loading;
        self.list_rx = Some(rx);
    }

    fn poll_list(&mut self) {
        let Some(rx) = self.list_rx.as_mut() else {
            return;
        };

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.list_rx = None;
                self.listing = Listing::Failed("list request was cancelled".to_string());
                return;
            }
        };
        self.list_rx = None;

        match result {
            Ok(theatres) => {
                info!("Loaded {} theatres", theatres.len());
                self.list_state
                    .select(if theatres.is_empty() { None } else { Some(0) });
                self.listing = Listing::Loaded(theatres);
            }
            Err(e) => {
                warn!("Error fetching theatre list: {}", e);
                self.listing = Listing::Failed(e.summary());
            }
        }
    }

    fn move_selection(&mut self, forward: bool) {
        let len = self.theatres().len();
        if len == 0 {
            return;
        }

        let next = match self.list_state.selected() {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        self.list_state.select(Some(next));
    }

    fn select_current(&mut self) {
        let Some(index) = self.list_state.selected() else {
            return;
        };

        match self.theatres().get(index).map(TheatreRecord::theatre_id) {
            Some(Some(theatre_id)) => self.details.set_theatre_id(Some(theatre_id)),
            Some(None) => warn!("Theatre at row {} has no id", index),
            None => {}
        }
    }

    fn render_list(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title.clone())
            .border_style(theme.border_style());

        let message = match &self.listing {
            Listing::Loading => Some(Line::from(Span::styled(
                "Loading theatres...",
                theme.placeholder_style(),
            ))),
            Listing::Failed(summary) => Some(Line::from(Span::styled(
                format!("Error fetching theatres: {}", summary),
                theme.error_style(),
            ))),
            Listing::Loaded(theatres) if theatres.is_empty() => Some(Line::from(Span::styled(
                "No theatres",
                theme.placeholder_style(),
            ))),
            Listing::Loaded(_) => None,
        };

        if let Some(message) = message {
            frame.render_widget(Paragraph::new(message).block(block), area);
            return;
        }

        let items: Vec<ListItem> = self
            .theatres()
            .iter()
            .map(|t| {
                ListItem::new(Line::from(vec![
                    Span::styled(t.name.clone(), theme.text_style()),
                    Span::styled(format!(" ({})", t.location), theme.dim_style()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(theme.selection_style())
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn render_details(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let refreshing = self.details.is_pending()
            && matches!(self.details.details(), DetailsState::Loaded(_));
        let title = match self.details.theatre_id() {
            Some(id) if refreshing => format!("Theatre {} (reloading)", id),
            Some(id) => format!("Theatre {}", id),
            None => "Theatre".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(theme.focused_border_style());

        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.details.render(frame, inner, theme);
    }
}

#[async_trait]
impl Page for TheatresPage {
    fn id(&self) -> &PageId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    async fn handle_key_event(&mut self, event: KeyEvent) -> Result<()> {
        if self.keys.up.matches(&event) {
            self.move_selection(false);
        } else if self.keys.down.matches(&event) {
            self.move_selection(true);
        } else if self.keys.select.matches(&event) {
            self.select_current();
        } else if self.keys.clear.matches(&event) {
            self.details.set_theatre_id(None);
        } else if self.keys.refresh.matches(&event) {
            if self.details.theatre_id().is_some() {
                self.details.refresh();
            } else {
                self.reload_list();
            }
        }
        Ok(())
    }

    async fn tick(&mut self) -> Result<()> {
        self.poll_list();
        self.details.tick().await
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        self.render_list(frame, chunks[0], theme);
        self.render_details(frame, chunks[1], theme);
    }

    async fn on_enter(&mut self) -> Result<()> {
        if self.list_rx.is_none() && !matches!(self.listing, Listing::Loaded(_)) {
            self.reload_list();
        }
        if let Some(theatre_id) = self.initial_theatre.take() {
            self.details.set_theatre_id(Some(theatre_id));
        }
        Ok(())
    }

    fn status(&self) -> Option<String> {
        match &self.listing {
            Listing::Loaded(theatres) => Some(format!("{} theatres", theatres.len())),
            _ => None,
        }
    }
}
