use crate::lookup::{TheatreId, TheatreLookup};
use crate::tui::{
    events::Event,
    keys::KeyMap,
    pages::{theatres::TheatresPage, PageManager},
    styles::Theme,
    utils::layout::centered_rect_percent,
    Frame,
};
use anyhow::Result;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::sync::Arc;
use tracing::debug;

/// Main application state and controller
pub struct App {
    /// Whether the application should quit
    pub should_quit: bool,

    /// Current application dimensions
    pub size: Rect,

    /// Key mappings for the application
    pub key_map: KeyMap,

    /// Page manager for handling different screens
    pub page_manager: PageManager,

    /// Current theme for styling
    pub theme: Theme,

    /// Show the key binding overlay
    pub show_help: bool,

    /// Where theatre data comes from, shown in the status bar
    pub source: String,
}

impl App {
    /// Create a new application instance on the theatre list page
    pub async fn new(
        lookup: Arc<dyn TheatreLookup>,
        source: String,
        initial_theatre: Option<TheatreId>,
    ) -> Result<Self> {
        let key_map = KeyMap::default();
        let mut page_manager = PageManager::new();

        let page = TheatresPage::new(lookup, key_map.clone()).with_initial_theatre(initial_theatre);
        page_manager.register_page(Box::new(page));
        page_manager.navigate_to("theatres").await?;

        Ok(Self {
            should_quit: false,
            size: Rect::default(),
            key_map,
            page_manager,
            theme: Theme::default(),
            show_help: false,
            source,
        })
    }

    /// Handle incoming events. Returns true once the application should exit.
    pub async fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key_event) => {
                if self.key_map.should_quit(&key_event) {
                    debug!("Quit requested");
                    self.should_quit = true;
                    return Ok(true);
                }

                if self.key_map.should_show_help(&key_event) {
                    self.show_help = !self.show_help;
                    return Ok(false);
                }

                if let Some(current_page) = self.page_manager.current_page_mut() {
                    current_page.handle_key_event(key_event).await?;
                    // Ticks stop while keys repeat, so drain fetch results here too
                    current_page.tick().await?;
                }
            }

            Event::Resize(width, height) => {
                self.size = Rect::new(0, 0, width, height);
                self.page_manager.resize(self.size);
            }

            Event::Tick => {
                if let Some(current_page) = self.page_manager.current_page_mut() {
                    current_page.tick().await?;
                }
            }
        }

        Ok(self.should_quit)
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame) {
        self.size = frame.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Main content
                Constraint::Length(1), // Status bar
            ])
            .split(frame.size());

        if let Some(current_page) = self.page_manager.current_page_mut() {
            current_page.render(frame, chunks[0], &self.theme);
        }

        self.render_status_bar(frame, chunks[1]);

        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    fn status_text(&self) -> String {
        let page_status = match self.page_manager.current_page() {
            Some(page) => match page.status() {
                Some(status) => format!("{}: {} | ", page.title(), status),
                None => format!("{} | ", page.title()),
            },
            None => String::new(),
        };

        format!("{}{} | Ctrl+G help | q quit", page_status, self.source)
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let status_paragraph =
            Paragraph::new(self.status_text()).style(self.theme.status_bar_style());
        frame.render_widget(status_paragraph, area);
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let help_area = centered_rect_percent(50, 50, frame.size());

        let help_block = Block::default()
            .borders(Borders::ALL)
            .title("Help")
            .style(self.theme.help_style());

        let help_paragraph = Paragraph::new(self.key_map.help_text())
            .block(help_block)
            .style(self.theme.text_style());

        frame.render_widget(Clear, help_area);
        frame.render_widget(help_paragraph, help_area);
    }
}
