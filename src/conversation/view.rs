/// Which panel occupies the left side of the conversation page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// The original statement.
    #[default]
    Document,
    /// Extracted transaction tables.
    Table,
    /// AI-generated insights dashboard.
    Insights,
}

impl ViewMode {
    /// Document button: show the statement, or fall back to the tables when
    /// it is already showing.
    pub fn toggle_document(self) -> Self {
        match self {
            ViewMode::Document => ViewMode::Table,
            _ => ViewMode::Document,
        }
    }

    /// Insights button: open the dashboard, or close it back to the tables.
    pub fn toggle_insights(self) -> Self {
        match self {
            ViewMode::Insights => ViewMode::Table,
            _ => ViewMode::Insights,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Document => "Document",
            ViewMode::Table => "Transactions",
            ViewMode::Insights => "Insights",
        }
    }
}

pub const MIN_ZOOM: u32 = 50;
pub const MAX_ZOOM: u32 = 200;
pub const ZOOM_STEP: u32 = 10;
pub const DEFAULT_ZOOM: u32 = 120;

/// Page and zoom of the document panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentViewer {
    page: u32,
    total_pages: u32,
    zoom: u32,
}

impl Default for DocumentViewer {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 1,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl DocumentViewer {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Scale factor handed to the renderer.
    pub fn scale(&self) -> f32 {
        self.zoom as f32 / 100.0
    }

    pub fn next_page(&mut self) {
        self.page = (self.page + 1).min(self.total_pages);
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// The renderer reported how many pages the document has. A count of
    /// zero is treated as one.
    pub fn set_total_pages(&mut self, total: u32) {
        self.total_pages = total.max(1);
        self.page = self.page.clamp(1, self.total_pages);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(ZOOM_STEP).max(MIN_ZOOM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_and_insights_exclude_each_other() {
        let mut mode = ViewMode::default();
        assert_eq!(mode, ViewMode::Document);
        mode = mode.toggle_insights();
        assert_eq!(mode, ViewMode::Insights);
        mode = mode.toggle_document();
        assert_eq!(mode, ViewMode::Document);
        mode = mode.toggle_document();
        assert_eq!(mode, ViewMode::Table);
        mode = mode.toggle_insights().toggle_insights();
        assert_eq!(mode, ViewMode::Table);
    }

    #[test]
    fn paging_stays_in_range() {
        let mut viewer = DocumentViewer::default();
        viewer.prev_page();
        assert_eq!(viewer.page(), 1);
        viewer.next_page();
        assert_eq!(viewer.page(), 1);

        viewer.set_total_pages(3);
        for _ in 0..5 {
            viewer.next_page();
        }
        assert_eq!(viewer.page(), 3);

        viewer.set_total_pages(2);
        assert_eq!(viewer.page(), 2);
        viewer.set_total_pages(0);
        assert_eq!((viewer.page(), viewer.total_pages()), (1, 1));
    }

    #[test]
    fn random_walk_keeps_page_and_zoom_bounded() {
        let mut viewer = DocumentViewer::default();
        viewer.set_total_pages(4);
        let mut seed: u32 = 7;
        for step in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let before = viewer.zoom();
            match (seed >> 16) % 5 {
                0 => viewer.next_page(),
                1 => viewer.prev_page(),
                2 => viewer.zoom_in(),
                3 => viewer.zoom_out(),
                _ => viewer.set_total_pages(1 + (seed >> 20) % 6),
            }
            assert!((1..=viewer.total_pages()).contains(&viewer.page()), "step {step}");
            assert!((MIN_ZOOM..=MAX_ZOOM).contains(&viewer.zoom()), "step {step}");
            let delta = viewer.zoom().abs_diff(before);
            assert!(delta == 0 || delta == ZOOM_STEP, "step {step}");
        }
    }

    #[test]
    fn zoom_clamps_at_bounds() {
        let mut viewer = DocumentViewer::default();
        for _ in 0..20 {
            viewer.zoom_in();
        }
        assert_eq!(viewer.zoom(), MAX_ZOOM);
        for _ in 0..30 {
            viewer.zoom_out();
        }
        assert_eq!(viewer.zoom(), MIN_ZOOM);
        viewer.zoom_in();
        assert_eq!(viewer.zoom(), 60);
        assert_eq!(viewer.scale(), 0.6);
    }
}
