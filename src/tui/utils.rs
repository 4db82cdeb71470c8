/// Layout helpers shared by overlays
pub mod layout {
    use ratatui::layout::Rect;

    /// The part of `area` covering `percent_x` by `percent_y` of it, centred
    pub fn centered_rect_percent(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
        let width = (area.width as u32 * percent_x.min(100) as u32 / 100) as u16;
        let height = (area.height as u32 * percent_y.min(100) as u32 / 100) as u16;

        Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        )
    }

}
