pub mod theatre_details;

pub use theatre_details::{DetailsState, TheatreDetails};

use crate::tui::{styles::Theme, Frame};
use anyhow::Result;
use async_trait::async_trait;
use ratatui::layout::Rect;

/// Base trait for all UI components
#[async_trait]
pub trait Component: Send + Sync {
    /// Handle periodic updates
    async fn tick(&mut self) -> Result<()> {
        Ok(())
    }

    /// Render the component
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);
}
