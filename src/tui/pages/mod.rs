pub mod theatres;

use crate::tui::{styles::Theme, Frame};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use std::collections::HashMap;

/// Page identifier type
pub type PageId = String;

/// Base trait for all pages
#[async_trait]
pub trait Page: Send + Sync {
    /// Get the page ID
    fn id(&self) -> &PageId;

    /// Get the page title
    fn title(&self) -> &str;

    /// Handle keyboard input
    async fn handle_key_event(&mut self, event: KeyEvent) -> Result<()>;

    /// Handle periodic updates
    async fn tick(&mut self) -> Result<()>;

    /// Render the page
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Called when the page becomes active
    async fn on_enter(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called when the page is resized
    fn on_resize(&mut self, _area: Rect) {}

    /// Short page-specific status, shown in the status bar
    fn status(&self) -> Option<String> {
        None
    }
}

/// Page manager for handling navigation between pages
pub struct PageManager {
    pages: HashMap<PageId, Box<dyn Page>>,
    current_page: Option<PageId>,
}

impl PageManager {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            current_page: None,
        }
    }

    /// Register a page
    pub fn register_page(&mut self, page: Box<dyn Page>) {
        let id = page.id().clone();
        self.pages.insert(id, page);
    }

    /// Navigate to a page and let it start its work
    pub async fn navigate_to(&mut self, page_id: &str) -> Result<()> {
        let page = self
            .pages
            .get_mut(page_id)
            .ok_or_else(|| anyhow::anyhow!("Page '{}' not found", page_id))?;

        page.on_enter().await?;
        self.current_page = Some(page_id.to_string());
        Ok(())
    }

    /// Get the current page mutably
    pub fn current_page_mut(&mut self) -> Option<&mut dyn Page> {
        let current_id = self.current_page.as_ref()?;
        match self.pages.get_mut(current_id) {
            Some(page) => Some(page.as_mut()),
            None => None,
        }
    }

    /// Get the current page
    pub fn current_page(&self) -> Option<&dyn Page> {
        let current_id = self.current_page.as_ref()?;
        self.pages.get(current_id).map(|p| p.as_ref())
    }

    /// Resize all pages
    pub fn resize(&mut self, area: Rect) {
        for page in self.pages.values_mut() {
            page.on_resize(area);
        }
    }
}

impl Default for PageManager {
    fn default() -> Self {
        Self::new()
    }
}
