use crate::api::DashboardApi;
use crate::csrf;
use crate::dom::{Document, Host, Page};
use crate::modal::{KeyEvent, KeyOutcome, ModalController, ModalOptions, Variant};
use crate::ui;
use std::time::Duration;

pub const ACTIONS_BUTTON: &str = "device-actions-button";
pub const ACTIONS_MENU: &str = "device-actions-menu";
pub const SEARCH_TOGGLE: &str = "device-search-toggle";
pub const SEARCH_CONTAINER: &str = "device-search-container";
pub const SEARCH_INPUT: &str = "device-search-input";
pub const ROW_ATTRIBUTE: &str = "data-device-name";
pub const DEVICE_LIST_URL: &str = "/devices/";

const OPEN_CLASS: &str = "max-w-xs";
const VISIBLE_CLASS: &str = "opacity-100";
pub const SEARCH_FOCUS_DELAY: Duration = Duration::from_millis(150);

/// Case-insensitive, unanchored substring match; an empty (or blank) term
/// matches every row.
pub fn matches(device_name: &str, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    needle.is_empty() || device_name.to_lowercase().contains(&needle)
}

/// Collapsible search box over the server-rendered device table.
#[derive(Default)]
pub struct DeviceSearch;

impl DeviceSearch {
    pub fn new() -> Self {
        Self
    }

    pub fn is_open(&self, doc: &Document) -> bool {
        doc.has_class(SEARCH_CONTAINER, OPEN_CLASS)
    }

    /// Hides non-matching rows in place; returns how many stay visible.
    pub fn filter(&self, doc: &mut Document, term: &str) -> usize {
        let mut visible = 0;
        for row in doc.elements_with_attribute(ROW_ATTRIBUTE) {
            let name = doc.attribute(&row, ROW_ATTRIBUTE).unwrap_or_default().to_string();
            if matches(&name, term) {
                doc.remove_class(&row, "hidden");
                visible += 1;
            } else {
                doc.add_class(&row, "hidden");
            }
        }
        visible
    }

    pub fn toggle(&self, doc: &mut Document) {
        let was_open = self.is_open(doc);
        doc.toggle_class(SEARCH_CONTAINER, OPEN_CLASS);
        doc.toggle_class(SEARCH_CONTAINER, VISIBLE_CLASS);

        if was_open {
            doc.cancel_timers(SEARCH_INPUT);
            doc.set_value(SEARCH_INPUT, "");
            self.filter(doc, "");
        } else if doc.exists(SEARCH_INPUT) {
            doc.focus_after(SEARCH_INPUT, SEARCH_FOCUS_DELAY);
        }
    }

    pub fn on_input(&self, doc: &mut Document, value: &str) -> usize {
        doc.set_value(SEARCH_INPUT, value);
        self.filter(doc, value)
    }

    /// Document-level click delegation: reacts to clicks anywhere inside
    /// the toggle control.
    pub fn handle_click(&self, doc: &mut Document, target: &str) -> bool {
        if doc.closest(target, |id, _| id == SEARCH_TOGGLE).is_none()
            || !doc.exists(SEARCH_CONTAINER)
        {
            return false;
        }
        self.toggle(doc);
        true
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceIntent {
    Delete { device_id: u64, csrf_token: String },
    Dismiss,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Rejected,
    Failed,
}

/// Actions dropdown and the delete-device confirmation flow.
#[derive(Default)]
pub struct DeviceActions {
    modal: ModalController<DeviceIntent>,
}

impl DeviceActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modal(&self) -> &ModalController<DeviceIntent> {
        &self.modal
    }

    pub fn toggle_menu(&self, doc: &mut Document) {
        doc.toggle_class(ACTIONS_MENU, "hidden");
    }

    /// Closes the dropdown for clicks outside both the button and the menu.
    pub fn handle_document_click(&self, doc: &mut Document, target: &str) {
        if !doc.exists(ACTIONS_BUTTON) || !doc.exists(ACTIONS_MENU) {
            return;
        }
        if !doc.contains(ACTIONS_BUTTON, target) && !doc.contains(ACTIONS_MENU, target) {
            doc.add_class(ACTIONS_MENU, "hidden");
        }
    }

    /// Asks for confirmation; nothing is sent until `confirm` runs.
    pub fn request_delete(&mut self, doc: &mut Document, device_id: u64, hostname: &str) {
        let Some(csrf_token) = csrf::find_token(doc, None) else {
            self.show_error(
                doc,
                "CSRF token not found. Please refresh the page and try again.",
            );
            return;
        };

        let options = ModalOptions::new(
            "Delete Device",
            &ui::render_delete_device_message(hostname),
            DeviceIntent::Delete {
                device_id,
                csrf_token,
            },
        )
        .confirm_text("Delete")
        .cancel_text("Cancel")
        .variant(Variant::Danger);
        self.modal.show(doc, options);
    }

    pub async fn confirm<A, H>(&mut self, page: &mut Page<H>, api: &A) -> Option<DeleteOutcome>
    where
        A: DashboardApi,
        H: Host,
    {
        let intent = self.modal.confirm(&mut page.doc)?;
        self.run(page, api, intent).await
    }

    pub fn cancel(&mut self, doc: &mut Document) {
        let _ = self.modal.cancel(doc);
    }

    /// Returns whether the click dismissed the open dialog.
    pub fn handle_backdrop_click(&mut self, doc: &mut Document, target: &str) -> bool {
        self.modal.handle_backdrop_click(doc, target).is_some()
    }

    pub async fn handle_key<A, H>(
        &mut self,
        page: &mut Page<H>,
        api: &A,
        event: &KeyEvent,
    ) -> KeyOutcome<DeleteOutcome>
    where
        A: DashboardApi,
        H: Host,
    {
        match self.modal.handle_key(&mut page.doc, event) {
            KeyOutcome::Confirmed(Some(intent)) => {
                KeyOutcome::Confirmed(self.run(page, api, intent).await)
            }
            KeyOutcome::Confirmed(None) => KeyOutcome::Confirmed(None),
            KeyOutcome::Cancelled(_) => KeyOutcome::Cancelled(None),
            KeyOutcome::FocusTrapped => KeyOutcome::FocusTrapped,
            KeyOutcome::Ignored => KeyOutcome::Ignored,
        }
    }

    async fn run<A, H>(
        &mut self,
        page: &mut Page<H>,
        api: &A,
        intent: DeviceIntent,
    ) -> Option<DeleteOutcome>
    where
        A: DashboardApi,
        H: Host,
    {
        let DeviceIntent::Delete {
            device_id,
            csrf_token,
        } = intent
        else {
            return None;
        };

        let outcome = match api.delete_device(device_id, &csrf_token).await {
            Ok(reply) if reply.success => {
                tracing::info!(device_id, "Device deleted");
                page.host.navigate(DEVICE_LIST_URL);
                DeleteOutcome::Deleted
            }
            Ok(reply) => {
                let reason = reply.message.unwrap_or_else(|| "Unknown error".to_string());
                tracing::warn!(device_id, %reason, "Device deletion rejected");
                self.show_error(&mut page.doc, &format!("Error deleting device: {reason}"));
                DeleteOutcome::Rejected
            }
            Err(err) => {
                tracing::error!(device_id, "Error deleting device: {err}");
                self.show_error(&mut page.doc, "Error deleting device. Please try again.");
                DeleteOutcome::Failed
            }
        };
        Some(outcome)
    }

    fn show_error(&mut self, doc: &mut Document, message: &str) {
        let options = ModalOptions::new("Error", message, DeviceIntent::Dismiss)
            .confirm_text("OK")
            .variant(Variant::Danger);
        self.modal.show(doc, options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::layout;
    use crate::modal::{self, Key};
    use crate::rules::ActionReply;
    use crate::test_utils::{ApiCall, FakeApi, RecordingHost, TOKEN};

    fn names() -> Vec<&'static str> {
        vec!["Web-01", "db-primary", "DB-replica", "mail"]
    }

    fn visible_rows(doc: &Document) -> Vec<String> {
        doc.elements_with_attribute(ROW_ATTRIBUTE)
            .into_iter()
            .filter(|row| !doc.has_class(row, "hidden"))
            .filter_map(|row| doc.attribute(&row, ROW_ATTRIBUTE).map(str::to_string))
            .collect()
    }

    #[test]
    fn match_is_case_insensitive_substring() {
        assert!(matches("db-primary", "PRIM"));
        assert!(matches("DB-Replica", "  replica "));
        assert!(matches("mail", ""));
        assert!(matches("mail", "   "));
        assert!(!matches("mail", "db"));
        assert!(matches("web-01", "b-0"));
    }

    #[test]
    fn filter_hides_rows_without_removing_them() {
        let mut doc = layout::dashboard(&names(), None);
        let search = DeviceSearch::new();
        assert_eq!(search.on_input(&mut doc, "DB"), 2);
        assert_eq!(visible_rows(&doc), vec!["db-primary", "DB-replica"]);
        assert_eq!(doc.elements_with_attribute(ROW_ATTRIBUTE).len(), 4);
    }

    #[test]
    fn mixed_case_row_names_keep_their_case() {
        let mut doc = layout::dashboard(&names(), None);
        let search = DeviceSearch::new();
        assert_eq!(search.on_input(&mut doc, "web"), 1);
        assert_eq!(visible_rows(&doc), vec!["Web-01"]);
        assert_eq!(search.on_input(&mut doc, "REPLICA"), 1);
        assert_eq!(visible_rows(&doc), vec!["DB-replica"]);
    }

    #[test]
    fn opening_focuses_input_after_transition() {
        let mut doc = layout::dashboard(&names(), None);
        let search = DeviceSearch::new();
        assert!(search.handle_click(&mut doc, "device-search-toggle-icon"));
        assert!(search.is_open(&doc));
        assert!(doc.has_class(SEARCH_CONTAINER, "opacity-100"));
        assert_eq!(doc.active_element(), None);
        doc.advance(SEARCH_FOCUS_DELAY);
        assert_eq!(doc.active_element(), Some(SEARCH_INPUT));
    }

    #[test]
    fn closing_clears_term_and_shows_everything() {
        let mut doc = layout::dashboard(&names(), None);
        let search = DeviceSearch::new();
        search.toggle(&mut doc);
        search.on_input(&mut doc, "zzz");
        assert!(visible_rows(&doc).is_empty());

        search.toggle(&mut doc);
        assert!(!search.is_open(&doc));
        assert_eq!(doc.value(SEARCH_INPUT), Some(""));
        assert_eq!(visible_rows(&doc).len(), 4);
    }

    #[test]
    fn clicks_elsewhere_do_not_toggle_search() {
        let mut doc = layout::dashboard(&names(), None);
        let search = DeviceSearch::new();
        assert!(!search.handle_click(&mut doc, "device-row-0"));
        assert!(!search.is_open(&doc));
    }

    #[test]
    fn actions_menu_closes_on_outside_click() {
        let mut doc = layout::dashboard(&names(), None);
        let actions = DeviceActions::new();
        actions.toggle_menu(&mut doc);
        assert!(!doc.has_class(ACTIONS_MENU, "hidden"));

        actions.handle_document_click(&mut doc, "device-delete-action");
        assert!(!doc.has_class(ACTIONS_MENU, "hidden"));

        actions.handle_document_click(&mut doc, "device-row-1");
        assert!(doc.has_class(ACTIONS_MENU, "hidden"));
    }

    #[tokio::test]
    async fn missing_token_shows_error_without_request() {
        let mut page = Page::new(layout::dashboard(&names(), None), RecordingHost::default());
        let api = FakeApi::default();
        let mut actions = DeviceActions::new();

        actions.request_delete(&mut page.doc, 5, "web-01");
        assert!(actions.modal().is_open(&page.doc));
        assert_eq!(page.doc.text(modal::TITLE), Some("Error"));
        assert_eq!(page.doc.text(modal::CONFIRM_BUTTON), Some("OK"));

        assert_eq!(actions.confirm(&mut page, &api).await, None);
        assert!(api.calls().is_empty());
        assert!(!actions.modal().is_open(&page.doc));
    }

    #[tokio::test]
    async fn confirmed_delete_navigates_to_device_list() {
        let mut page = Page::new(layout::dashboard(&names(), Some(TOKEN)), RecordingHost::default());
        let api = FakeApi::default();
        api.push_device_delete(Ok(ActionReply {
            success: true,
            message: None,
        }));
        let mut actions = DeviceActions::new();

        actions.request_delete(&mut page.doc, 5, "web-01");
        assert_eq!(page.doc.text(modal::TITLE), Some("Delete Device"));
        assert!(page.doc.inner_html(modal::MESSAGE).unwrap().contains("web-01"));

        assert_eq!(
            actions.confirm(&mut page, &api).await,
            Some(DeleteOutcome::Deleted)
        );
        assert_eq!(
            api.calls(),
            vec![ApiCall::DeleteDevice {
                device_id: 5,
                csrf_token: TOKEN.to_string()
            }]
        );
        assert_eq!(page.host.navigations, vec![DEVICE_LIST_URL]);
    }

    #[tokio::test]
    async fn cancelled_delete_sends_nothing() {
        let mut page = Page::new(layout::dashboard(&names(), Some(TOKEN)), RecordingHost::default());
        let api = FakeApi::default();
        let mut actions = DeviceActions::new();

        actions.request_delete(&mut page.doc, 5, "web-01");
        let outcome = actions
            .handle_key(&mut page, &api, &KeyEvent::new(Key::Escape))
            .await;
        assert_eq!(outcome, KeyOutcome::Cancelled(None));
        assert!(api.calls().is_empty());
        assert!(page.host.navigations.is_empty());
    }

    #[tokio::test]
    async fn enter_on_confirm_button_deletes() {
        let mut page = Page::new(layout::dashboard(&names(), Some(TOKEN)), RecordingHost::default());
        let api = FakeApi::default();
        api.push_device_delete(Ok(ActionReply {
            success: true,
            message: None,
        }));
        let mut actions = DeviceActions::new();

        actions.request_delete(&mut page.doc, 8, "mail");
        page.doc.advance(modal::FOCUS_DELAY);
        let outcome = actions
            .handle_key(&mut page, &api, &KeyEvent::new(Key::Enter))
            .await;
        assert_eq!(outcome, KeyOutcome::Confirmed(Some(DeleteOutcome::Deleted)));
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn rejected_delete_shows_server_message() {
        let mut page = Page::new(layout::dashboard(&names(), Some(TOKEN)), RecordingHost::default());
        let api = FakeApi::default();
        api.push_device_delete(Ok(ActionReply {
            success: false,
            message: Some("Device has pending reports".into()),
        }));
        let mut actions = DeviceActions::new();

        actions.request_delete(&mut page.doc, 5, "web-01");
        assert_eq!(
            actions.confirm(&mut page, &api).await,
            Some(DeleteOutcome::Rejected)
        );
        assert!(actions.modal().is_open(&page.doc));
        assert_eq!(
            page.doc.inner_html(modal::MESSAGE),
            Some("Error deleting device: Device has pending reports")
        );
        assert!(page.host.navigations.is_empty());
    }

    #[tokio::test]
    async fn rejected_delete_without_message_uses_fallback() {
        let mut page = Page::new(layout::dashboard(&names(), Some(TOKEN)), RecordingHost::default());
        let api = FakeApi::default();
        api.push_device_delete(Ok(ActionReply::default()));
        let mut actions = DeviceActions::new();

        actions.request_delete(&mut page.doc, 5, "web-01");
        actions.confirm(&mut page, &api).await;
        assert_eq!(
            page.doc.inner_html(modal::MESSAGE),
            Some("Error deleting device: Unknown error")
        );
    }

    #[tokio::test]
    async fn transport_failure_shows_generic_error() {
        let mut page = Page::new(layout::dashboard(&names(), Some(TOKEN)), RecordingHost::default());
        let api = FakeApi::default();
        api.push_device_delete(Err(ApiError::Transport("connection reset".into())));
        let mut actions = DeviceActions::new();

        actions.request_delete(&mut page.doc, 5, "web-01");
        assert_eq!(
            actions.confirm(&mut page, &api).await,
            Some(DeleteOutcome::Failed)
        );
        assert_eq!(
            page.doc.inner_html(modal::MESSAGE),
            Some("Error deleting device. Please try again.")
        );
    }
}
