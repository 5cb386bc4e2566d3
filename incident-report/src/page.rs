use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::edits::{ReportEdits, REQUIRED_ON_CREATE};
use crate::error::{ReportError, Result};
use crate::model::IncidentReport;
use crate::reports_url::ReportsURL;
use crate::transport::{JsonResponse, JsonTransport, REPORT_NUMBER_HEADER};
use crate::view::ReportView;

/// Values the hosting page supplies up front.
#[derive(Debug, Clone)]
pub struct PageSettings {
    pub reports_url: ReportsURL,
    /// Report to open on first load; `None` starts a new report.
    pub initial_number: Option<i64>,
    pub editing_allowed: bool,
}

/// The held record. Written only by the page that owns it.
#[derive(Debug, Default)]
pub struct ReportState {
    report: Option<IncidentReport>,
}

impl ReportState {
    pub fn get(&self) -> Option<&IncidentReport> {
        self.report.as_ref()
    }

    fn replace(&mut self, report: IncidentReport) -> &IncidentReport {
        self.report.insert(report)
    }

    fn set_number(&mut self, number: i64) {
        if let Some(report) = self.report.as_mut() {
            report.insert("number", number);
        }
    }
}

pub struct ReportPage<T, V> {
    transport: T,
    view: V,
    settings: PageSettings,
    state: ReportState,
    entry_input_bound: bool,
}

impl<T: JsonTransport, V: ReportView> ReportPage<T, V> {
    pub fn new(transport: T, view: V, settings: PageSettings) -> Self {
        Self {
            transport,
            view,
            settings,
            state: ReportState::default(),
            entry_input_bound: false,
        }
    }

    pub fn report(&self) -> Option<&IncidentReport> {
        self.state.get()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Lock the page, then load and show the report.
    ///
    /// Failures have already been shown to the user when this returns.
    pub async fn initialize(&mut self) -> Result<()> {
        self.view.disable_editing();
        self.load_and_display().await
    }

    /// Fetch the held report again, or the initial one if nothing is held yet.
    ///
    /// Without a number there is nothing to fetch and a placeholder is held
    /// instead. On failure editing is disabled and the held report is kept.
    pub async fn load(&mut self) -> Result<&IncidentReport> {
        let number = match self.state.get() {
            Some(report) => report.number(),
            None => self.settings.initial_number,
        };

        let Some(number) = number else {
            return Ok(self.state.replace(IncidentReport::placeholder()));
        };

        match self.fetch(number).await {
            Ok(report) => Ok(self.state.replace(report)),
            Err(e) => {
                self.view.disable_editing();
                let message = format!("Failed to load incident report:\n{}", e);
                error!("{}", message);
                self.view.alert(&message);
                Err(e)
            }
        }
    }

    pub async fn load_and_display(&mut self) -> Result<()> {
        self.load().await?;

        let Some(report) = self.state.get() else {
            let message = ReportError::NotLoaded.to_string();
            warn!("{}", message);
            self.view.alert(&message);
            return Err(ReportError::NotLoaded);
        };

        self.view.draw_report_entries(&report.report_entries());

        if !self.entry_input_bound {
            self.view.bind_entry_input();
            self.entry_input_bound = true;
        }

        if self.settings.editing_allowed {
            self.view.enable_editing();
        }

        Ok(())
    }

    /// Apply `edits` to the held report on the server, creating it if it has
    /// no number yet.
    ///
    /// `on_success` runs before the report is reloaded. On failure
    /// `on_error` runs, the report is reloaded and then the user is alerted.
    pub async fn send_edits<S, E>(
        &mut self,
        mut edits: ReportEdits,
        on_success: S,
        on_error: E,
    ) -> Result<()>
    where
        S: FnOnce(),
        E: FnOnce(),
    {
        let Some(held) = self.state.get() else {
            return self.edit_failed(ReportError::NotLoaded, on_error).await;
        };

        let number = held.number();
        let url = match number {
            None => {
                for key in REQUIRED_ON_CREATE {
                    if !edits.contains_key(key) {
                        if let Some(value) = held.field(key) {
                            edits.insert(key, value.clone());
                        }
                    }
                }
                self.settings.reports_url.collection()
            }
            Some(number) => {
                edits.insert("number", Value::from(number));
                self.settings.reports_url.report(number)
            }
        };

        let response = match self.transport.request(&url, Some(&edits.as_json())).await {
            Ok(response) => response,
            Err(e) => return self.edit_failed(e.into(), on_error).await,
        };

        if number.is_none() {
            match assigned_number(&response) {
                Ok(assigned) => {
                    info!("Created incident report #{}", assigned);
                    self.state.set_number(assigned);
                }
                Err(e) => return self.edit_failed(e, on_error).await,
            }
        }

        on_success();

        if let Err(e) = self.load_and_display().await {
            debug!("Reload after edit failed: {}", e);
        }

        Ok(())
    }

    /// Add `text` as a new report entry. Blank input is ignored.
    pub async fn submit_report_entry(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        self.send_edits(ReportEdits::new().add_report_entry(text), || {}, || {})
            .await
            .is_ok()
    }

    pub async fn submit_summary(&mut self, summary: &str) -> bool {
        self.send_edits(ReportEdits::new().summary(summary.trim()), || {}, || {})
            .await
            .is_ok()
    }

    async fn fetch(&self, number: i64) -> Result<IncidentReport> {
        let url = self.settings.reports_url.report(number);
        let response = self.transport.request(&url, None).await?;
        let body = response
            .body
            .ok_or_else(|| ReportError::Decode("empty response body".to_string()))?;

        IncidentReport::try_from(body)
    }

    async fn edit_failed<E: FnOnce()>(&mut self, err: ReportError, on_error: E) -> Result<()> {
        let message = format!("Failed to apply edit:\n{}", err);
        warn!("{}", message);
        on_error();

        if let Err(e) = self.load_and_display().await {
            debug!("Reload after failed edit also failed: {}", e);
        }

        self.view.alert(&message);
        Err(err)
    }
}

fn assigned_number(response: &JsonResponse) -> Result<i64> {
    let raw = response
        .header(REPORT_NUMBER_HEADER)
        .ok_or(ReportError::MissingNumberHeader)?;

    raw.trim()
        .parse::<i64>()
        .map_err(|_| ReportError::InvalidNumberHeader(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{Journal, MockTransport};
    use crate::transport::TransportError;
    use crate::view::recording::RecordingView;
    use serde_json::json;
    use std::cell::Cell;

    const BASE: &str = "http://ims/api/incident_reports";

    fn make_page(
        initial_number: Option<i64>,
        editing_allowed: bool,
    ) -> (ReportPage<MockTransport, RecordingView>, MockTransport, Journal) {
        let journal = Journal::default();
        let transport = MockTransport::new(journal.clone());
        let page = ReportPage::new(
            transport.clone(),
            RecordingView::new(journal.clone()),
            PageSettings {
                reports_url: ReportsURL::new(BASE),
                initial_number,
                editing_allowed,
            },
        );
        (page, transport, journal)
    }

    fn report_json(number: i64) -> Value {
        json!({
            "number": number,
            "created": "2020-01-01",
            "summary": "Something",
            "report_entries": [
                {"author": "Hubcap", "text": "Entry", "created": "2020-01-01T00:00:00Z", "system_entry": false}
            ],
        })
    }

    fn server_error() -> TransportError {
        TransportError::Status {
            status: 500,
            body: "500".to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_without_number_holds_placeholder() {
        let (mut page, transport, _) = make_page(None, true);

        let report = page.load().await.unwrap();

        assert_eq!(report, &IncidentReport::placeholder());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_load_with_number_holds_response() {
        let (mut page, transport, _) = make_page(Some(3), true);
        transport.respond_json(report_json(3));

        page.load().await.unwrap();

        assert_eq!(transport.gets(), vec![format!("{}/3", BASE)]);
        let held = serde_json::to_value(page.report().unwrap()).unwrap();
        assert_eq!(held, report_json(3));
    }

    #[tokio::test]
    async fn test_sparse_report_is_held_verbatim() {
        let payload = json!({"number": 9, "summary": null, "report_entries": [{"text": "t"}]});
        let (mut page, transport, journal) = make_page(Some(9), true);
        transport.respond_json(payload.clone());

        page.load_and_display().await.unwrap();

        let held = serde_json::to_value(page.report().unwrap()).unwrap();
        assert_eq!(held, payload);
        assert_eq!(journal.count("draw 1"), 1);
        assert_eq!(page.view().drawn[0].text, "t");
    }

    #[tokio::test]
    async fn test_load_failure_before_first_load_leaves_nothing_held() {
        let (mut page, transport, journal) = make_page(Some(3), true);
        transport.fail(server_error());

        assert!(page.load().await.is_err());

        assert!(page.report().is_none());
        assert!(!page.view().editing_enabled);
        assert_eq!(journal.count("disable_editing"), 1);
        assert!(page.view().alerts[0].starts_with("Failed to load incident report:\n"));
    }

    #[tokio::test]
    async fn test_load_failure_keeps_held_report() {
        let (mut page, transport, _) = make_page(Some(3), true);
        transport.respond_json(report_json(3));
        page.load_and_display().await.unwrap();
        assert!(page.view().editing_enabled);

        transport.fail(server_error());
        assert!(page.load_and_display().await.is_err());

        assert_eq!(page.report().unwrap().number(), Some(3));
        assert_eq!(page.report().unwrap().summary(), Some("Something"));
        assert!(!page.view().editing_enabled);
    }

    #[tokio::test]
    async fn test_undecodable_report_is_a_load_failure() {
        let (mut page, transport, _) = make_page(Some(3), true);
        transport.respond_json(json!(["not", "a", "report"]));

        let err = page.load().await.unwrap_err();

        assert!(matches!(err, ReportError::Decode(_)));
        assert!(page.report().is_none());
    }

    #[tokio::test]
    async fn test_initialize_disables_editing_before_loading() {
        let (mut page, transport, journal) = make_page(Some(9), true);
        transport.respond_json(report_json(9));

        page.initialize().await.unwrap();

        assert_eq!(
            journal.entries(),
            vec![
                "disable_editing".to_string(),
                format!("GET {}/9", BASE),
                "draw 1".to_string(),
                "bind_entry_input".to_string(),
                "enable_editing".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_display_respects_editing_permission() {
        let (mut page, _, journal) = make_page(None, false);

        page.initialize().await.unwrap();

        assert!(!page.view().editing_enabled);
        assert_eq!(journal.count("enable_editing"), 0);
    }

    #[tokio::test]
    async fn test_entry_input_bound_once() {
        let (mut page, _, journal) = make_page(None, true);

        page.load_and_display().await.unwrap();
        page.load_and_display().await.unwrap();
        page.load_and_display().await.unwrap();

        assert_eq!(journal.count("bind_entry_input"), 1);
        assert_eq!(journal.count("draw"), 3);
    }

    #[tokio::test]
    async fn test_creating_edit_posts_to_collection() {
        let (mut page, transport, _) = make_page(None, true);
        page.load_and_display().await.unwrap();
        transport.respond_created("12");
        transport.respond_json(report_json(12));

        page.send_edits(ReportEdits::new().summary("x"), || {}, || {})
            .await
            .unwrap();

        let posts = transport.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].url, format!("{}/", BASE));
        assert_eq!(posts[0].body, Some(json!({"summary": "x"})));
    }

    #[tokio::test]
    async fn test_creating_edit_without_number_header_fails() {
        let (mut page, transport, _) = make_page(None, true);
        page.load_and_display().await.unwrap();
        transport.respond_no_content();

        let succeeded = Cell::new(false);
        let failed = Cell::new(false);
        let result = page
            .send_edits(
                ReportEdits::new().summary("x"),
                || succeeded.set(true),
                || failed.set(true),
            )
            .await;

        assert!(matches!(result, Err(ReportError::MissingNumberHeader)));
        assert!(failed.get());
        assert!(!succeeded.get());
        assert_eq!(page.report().unwrap().number(), None);
        assert_eq!(
            page.view().alerts,
            vec!["Failed to apply edit:\nNo Incident-Report-Number header provided.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_creating_edit_with_non_integer_header_fails() {
        let (mut page, transport, _) = make_page(None, true);
        page.load_and_display().await.unwrap();
        transport.respond_created("abc");

        let succeeded = Cell::new(false);
        let failed = Cell::new(false);
        let result = page
            .send_edits(
                ReportEdits::new().summary("x"),
                || succeeded.set(true),
                || failed.set(true),
            )
            .await;

        assert!(matches!(result, Err(ReportError::InvalidNumberHeader(ref v)) if v == "abc"));
        assert!(failed.get());
        assert!(!succeeded.get());
        assert_eq!(page.report().unwrap().number(), None);
    }

    #[tokio::test]
    async fn test_updating_edit_forces_number() {
        let (mut page, transport, _) = make_page(Some(7), true);
        transport.respond_json(report_json(7));
        page.load_and_display().await.unwrap();
        transport.respond_no_content();
        transport.respond_json(report_json(7));

        page.send_edits(
            ReportEdits::new().summary("y").set("number", 99),
            || {},
            || {},
        )
        .await
        .unwrap();

        let posts = transport.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].url, format!("{}/7", BASE));
        assert_eq!(posts[0].body, Some(json!({"summary": "y", "number": 7})));
    }

    #[tokio::test]
    async fn test_assigned_number_targets_later_edits() {
        let (mut page, transport, _) = make_page(None, true);
        page.load_and_display().await.unwrap();
        transport.respond_created("42");
        transport.fail(server_error());

        page.send_edits(ReportEdits::new().summary("x"), || {}, || {})
            .await
            .unwrap();
        // The reload failed, so the back-filled number is still what is held.
        assert_eq!(page.report().unwrap().number(), Some(42));

        transport.respond_no_content();
        transport.respond_json(report_json(42));
        page.send_edits(ReportEdits::new().summary("z"), || {}, || {})
            .await
            .unwrap();

        assert_eq!(transport.posts()[1].url, format!("{}/42", BASE));
    }

    #[tokio::test]
    async fn test_write_failure_orders_error_reload_alert() {
        let (mut page, transport, journal) = make_page(Some(7), true);
        transport.respond_json(report_json(7));
        page.load_and_display().await.unwrap();
        transport.fail(server_error());
        transport.respond_json(report_json(7));

        let journal_for_error = journal.clone();
        let result = page
            .send_edits(
                ReportEdits::new().add_report_entry("hello"),
                || panic!("success continuation must not run"),
                move || journal_for_error.push("on_error"),
            )
            .await;

        assert!(result.is_err());
        let reload = format!("GET {}/7", BASE);
        let entries = journal.entries();
        let post_at = journal.position(&format!("POST {}/7", BASE)).unwrap();
        let error_at = journal.position("on_error").unwrap();
        let reload_at = post_at
            + entries[post_at..]
                .iter()
                .position(|e| *e == reload)
                .unwrap();
        let alert_at = journal.position("alert").unwrap();

        assert!(post_at < error_at);
        assert!(error_at < reload_at);
        assert!(reload_at < alert_at);
        assert_eq!(transport.gets().len(), 2);
        assert_eq!(page.view().alerts.len(), 1);
    }

    #[tokio::test]
    async fn test_edit_before_any_load_fails() {
        let (mut page, transport, _) = make_page(None, true);

        let failed = Cell::new(false);
        let result = page
            .send_edits(ReportEdits::new().summary("x"), || {}, || failed.set(true))
            .await;

        assert!(matches!(result, Err(ReportError::NotLoaded)));
        assert!(failed.get());
        assert!(transport.posts().is_empty());
        // The reload in the failure path still leaves a placeholder behind.
        assert_eq!(page.report().unwrap().number(), None);
    }

    #[tokio::test]
    async fn test_blank_entry_is_not_sent() {
        let (mut page, transport, _) = make_page(None, true);
        page.load_and_display().await.unwrap();

        assert!(!page.submit_report_entry("   ").await);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_submit_report_entry_sends_trimmed_text() {
        let (mut page, transport, _) = make_page(Some(4), true);
        transport.respond_json(report_json(4));
        page.load_and_display().await.unwrap();
        transport.respond_no_content();
        transport.respond_json(report_json(4));

        assert!(page.submit_report_entry("  Ranger on scene \n").await);

        assert_eq!(
            transport.posts()[0].body,
            Some(json!({"report_entries": [{"text": "Ranger on scene"}], "number": 4}))
        );
    }

    #[tokio::test]
    async fn test_new_report_scenario() {
        let (mut page, transport, _) = make_page(None, true);
        page.initialize().await.unwrap();
        transport.respond_created("5");
        transport.respond_json(json!({"number": 5, "created": "2020-01-01T00:00:00Z", "title": "x", "report_entries": []}));

        page.send_edits(ReportEdits::new().set("title", "x"), || {}, || {})
            .await
            .unwrap();

        assert_eq!(transport.posts()[0].url, format!("{}/", BASE));
        assert_eq!(transport.gets(), vec![format!("{}/5", BASE)]);
        let held = page.report().unwrap();
        assert_eq!(held.number(), Some(5));
        assert_eq!(held.field("title"), Some(&json!("x")));
    }

    #[tokio::test]
    async fn test_existing_report_scenario() {
        let (mut page, transport, journal) = make_page(Some(9), true);
        transport.respond_json(json!({"number": 9, "created": "2020-01-01", "report_entries": []}));

        page.initialize().await.unwrap();

        assert_eq!(transport.gets(), vec![format!("{}/9", BASE)]);
        assert_eq!(journal.count("draw 0"), 1);
        assert!(page.view().editing_enabled);
        assert_eq!(page.report().unwrap().created(), Some("2020-01-01"));
    }

    #[tokio::test]
    async fn test_server_error_scenario() {
        let (mut page, transport, journal) = make_page(Some(9), true);
        transport.respond_json(report_json(9));
        page.initialize().await.unwrap();
        transport.fail(server_error());
        transport.respond_json(report_json(9));

        let failed = Cell::new(false);
        let _ = page
            .send_edits(ReportEdits::new().summary("x"), || {}, || failed.set(true))
            .await;

        assert!(failed.get());
        assert_eq!(transport.gets().len(), 2);
        assert_eq!(journal.count("alert"), 1);
        assert!(page.view().alerts[0].contains("Failed to apply edit"));
        assert!(page.view().alerts[0].contains("500"));
    }
}
