use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::chat::ChatSession;
use super::panel::PanelState;
use super::render;
use super::view::{DocumentViewer, ViewMode};
use crate::adapters::{decode_tables, unwrap_insights, InsightsRecord, TableDataset};
use crate::api::AnalysisService;
use crate::document::{UploadRecord, UploadStateStore};
use crate::error::{FinsightsError, Result};

/// Point-in-time copy of everything the page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    pub mode: ViewMode,
    pub viewer: DocumentViewer,
    pub tables: PanelState<Vec<TableDataset>>,
    pub insights: PanelState<InsightsRecord>,
    pub alerts: Vec<String>,
}

#[derive(Default)]
struct PageState {
    mode: ViewMode,
    viewer: DocumentViewer,
    tables: PanelState<Vec<TableDataset>>,
    insights: PanelState<InsightsRecord>,
    alerts: Vec<String>,
}

/// The conversation page for one uploaded statement.
///
/// Owns the panel state machine and the chat session. Both data panels load
/// concurrently on [`mount`](Self::mount); each settles on its own and a
/// failure in one never touches the other. Once [`dispose`](Self::dispose)
/// is called, responses still in flight are dropped.
pub struct ConversationPage {
    record: UploadRecord,
    service: Arc<dyn AnalysisService>,
    state: Mutex<PageState>,
    chat: ChatSession,
    disposed: CancellationToken,
}

impl ConversationPage {
    pub fn new(record: UploadRecord, service: Arc<dyn AnalysisService>) -> Self {
        let disposed = CancellationToken::new();
        let chat = ChatSession::new(record.id.clone(), service.clone(), disposed.clone());
        Self {
            record,
            service,
            state: Mutex::new(PageState::default()),
            chat,
            disposed,
        }
    }

    /// Open the page for the current upload, restoring it from durable
    /// storage if needed. `None` when nothing has been uploaded.
    pub fn open(store: &UploadStateStore, service: Arc<dyn AnalysisService>) -> Option<Self> {
        match store.get() {
            Some(record) => Some(Self::new(record, service)),
            None => {
                tracing::info!("no uploaded document to open");
                None
            }
        }
    }

    pub fn record(&self) -> &UploadRecord {
        &self.record
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// Fetch tables and insights concurrently.
    pub async fn mount(&self) {
        tracing::info!(
            id = ?self.record.id,
            name = %self.record.name,
            "mounting conversation page"
        );
        tokio::join!(self.load_tables(), self.load_insights());
    }

    async fn load_tables(&self) {
        let result = self.fetch_tables().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "transactions panel degraded");
        }
        self.apply(|state| state.tables = PanelState::from_result(result));
    }

    async fn fetch_tables(&self) -> Result<Vec<TableDataset>> {
        let id = self.record.id.as_deref().ok_or(FinsightsError::MissingIdentity)?;
        let response = self.service.get_tables(id).await?;
        decode_tables(response.result)
    }

    async fn load_insights(&self) {
        let Some(id) = self.record.id.as_deref() else {
            let err = FinsightsError::MissingIdentity;
            tracing::warn!("insights requested before the document was submitted");
            self.apply(|state| {
                state.alerts.push(err.to_string());
                state.insights = PanelState::Failed(err.to_string());
            });
            return;
        };

        let result = match self.service.get_insights(id).await {
            Ok(response) => unwrap_insights(response),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            tracing::warn!(error = %e, "insights panel degraded");
        }
        self.apply(|state| state.insights = PanelState::from_result(result));
    }

    fn apply(&self, update: impl FnOnce(&mut PageState)) {
        if self.disposed.is_cancelled() {
            tracing::debug!("dropping response for a closed page");
            return;
        }
        update(&mut *self.state.lock());
    }

    /// Tear the page down; later responses are ignored.
    pub fn dispose(&self) {
        self.disposed.cancel();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.is_cancelled()
    }

    pub fn snapshot(&self) -> PageSnapshot {
        let state = self.state.lock();
        PageSnapshot {
            mode: state.mode,
            viewer: state.viewer,
            tables: state.tables.clone(),
            insights: state.insights.clone(),
            alerts: state.alerts.clone(),
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.state.lock().mode
    }

    pub fn select_view(&self, mode: ViewMode) {
        self.state.lock().mode = mode;
    }

    pub fn toggle_document(&self) -> ViewMode {
        let mut state = self.state.lock();
        state.mode = state.mode.toggle_document();
        state.mode
    }

    pub fn toggle_insights(&self) -> ViewMode {
        let mut state = self.state.lock();
        state.mode = state.mode.toggle_insights();
        state.mode
    }

    pub fn next_page(&self) {
        self.state.lock().viewer.next_page();
    }

    pub fn prev_page(&self) {
        self.state.lock().viewer.prev_page();
    }

    pub fn zoom_in(&self) {
        self.state.lock().viewer.zoom_in();
    }

    pub fn zoom_out(&self) {
        self.state.lock().viewer.zoom_out();
    }

    /// Page count reported by the document renderer.
    pub fn report_page_count(&self, total: u32) {
        self.state.lock().viewer.set_total_pages(total);
    }

    /// Alerts raised since the last call, oldest first.
    pub fn take_alerts(&self) -> Vec<String> {
        std::mem::take(&mut self.state.lock().alerts)
    }

    /// Text of the active panel.
    pub fn render(&self) -> String {
        let snapshot = self.snapshot();
        match snapshot.mode {
            ViewMode::Document => render::document(&self.record, &snapshot.viewer),
            ViewMode::Table => render::tables(&snapshot.tables),
            ViewMode::Insights => render::insights(&snapshot.insights),
        }
    }
}
