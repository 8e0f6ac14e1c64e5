use std::sync::Arc;

use finsights::api::{Endpoint, MockAnalysisService, TablePayload};
use finsights::conversation::{ConversationPage, Role, ViewMode, FALLBACK_REPLY};
use finsights::document::{SelectedFile, SqliteStore, UploadFlow, UploadStateStore};
use serde_json::json;

const STATEMENT: &[u8] = b"%PDF-1.4\n1 0 obj << /Type /Pages >>\n2 0 obj << /Type /Page >>\n%%EOF";

fn insights_body() -> serde_json::Value {
    json!({
        "result": {
            "credits": [
                {"category": "Paycheck", "description": "JL", "total_amount": 120.0, "transaction_count": 3, "notes": ""}
            ],
            "debits": [
                {"category": "Subscriptions", "description": "Gym", "total_amount": 167.4, "transaction_count": 6, "notes": ""}
            ],
            "trends": {
                "income_pattern": "Regular.",
                "spending_pattern": "Steady.",
                "notable_observation": "None.",
                "cash_flow_alert": "None.",
                "recurring_expenses": "Gym.",
                "credit_debit_ratio": {"total_credits": 120.0, "total_debits": 167.4, "ratio": 0.72}
            }
        }
    })
}

fn sqlite_store(dir: &std::path::Path) -> UploadStateStore {
    UploadStateStore::new(Arc::new(SqliteStore::open(dir).expect("open sqlite store")))
}

#[tokio::test]
async fn upload_reload_then_converse() {
    let state_dir = tempfile::tempdir().expect("tempdir");
    let mock = Arc::new(
        MockAnalysisService::new()
            .with_submit_id("doc-7")
            .with_tables(TablePayload::One(
                r#"[{"id": 1, "date": "01 Nov", "transaction": "Gym", "amount": -27.9}]"#.into(),
            ))
            .with_insights(insights_body())
            .with_answers(["You spent $167.40 on subscriptions."]),
    );

    let hash = {
        let store = sqlite_store(state_dir.path());
        let flow = UploadFlow::new(store.clone(), mock.clone());
        let selected = flow
            .select(SelectedFile::from_bytes("nov.pdf", STATEMENT.to_vec()))
            .expect("select");
        flow.submit().await.expect("submit");
        selected.hash
    };

    // A fresh process sees the persisted record, identity included.
    let store = sqlite_store(state_dir.path());
    let page = ConversationPage::open(&store, mock.clone()).expect("record restored");
    assert_eq!(page.record().hash, hash);
    assert_eq!(page.record().id.as_deref(), Some("doc-7"));

    page.mount().await;
    let snapshot = page.snapshot();
    assert_eq!(snapshot.mode, ViewMode::Document);
    assert_eq!(snapshot.tables.data().expect("tables").len(), 1);
    assert!(snapshot.insights.is_ready());

    page.toggle_insights();
    assert!(page.render().contains("Subscriptions - $167.40"));

    page.chat().set_input("How much on subscriptions?");
    page.chat().submit_input().await;
    let messages = page.chat().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].content, "You spent $167.40 on subscriptions.");
    assert_eq!(
        mock.queries(),
        vec![("doc-7".to_string(), "How much on subscriptions?".to_string())]
    );
    assert_eq!(mock.calls(Endpoint::Submit), 1);
}

#[tokio::test]
async fn unsubmitted_record_degrades_without_network() {
    let state_dir = tempfile::tempdir().expect("tempdir");
    let mock = Arc::new(MockAnalysisService::new().with_answers(["unused"]));
    {
        let store = sqlite_store(state_dir.path());
        UploadFlow::new(store, mock.clone())
            .select(SelectedFile::from_bytes("dec.pdf", STATEMENT.to_vec()))
            .expect("select");
    }

    let store = sqlite_store(state_dir.path());
    let page = ConversationPage::open(&store, mock.clone()).expect("record restored");
    assert_eq!(page.record().id, None);

    page.mount().await;
    let alerts = page.take_alerts();
    assert_eq!(alerts.len(), 1);
    assert!(page.snapshot().insights.error().is_some());

    page.chat().send_query("anything?").await;
    assert_eq!(page.chat().messages()[1].content, FALLBACK_REPLY);
    assert!(!page.chat().is_loading());
    assert_eq!(mock.total_calls(), 0);
}

#[tokio::test]
async fn no_record_means_no_page() {
    let state_dir = tempfile::tempdir().expect("tempdir");
    let store = sqlite_store(state_dir.path());
    assert!(ConversationPage::open(&store, Arc::new(MockAnalysisService::new())).is_none());
}
