use crate::api::DashboardApi;
use crate::csrf;
use crate::dom::{Document, Element, Host, Page, Tag};
use crate::error::ApiError;
use crate::rules::{self, EventType, SilenceRule, SubmitReply, ToggleReply};
use crate::ui::{self, Tone};

pub const PANEL: &str = "silence-rules-panel";
pub const PANEL_BUTTON_CLASS: &str = "silence-rules-panel-button";
pub const CONTAINER: &str = "silence-rules-container";
pub const FORM: &str = "silence-rule-form";
pub const FORM_TITLE: &str = "silence-rule-form-title";
pub const SUBMIT_TEXT: &str = "silence-rule-submit-text";
pub const CANCEL_BUTTON: &str = "silence-rule-cancel-btn";
pub const FORM_ERRORS: &str = "silence-rule-form-errors";
pub const ERROR_LIST: &str = "silence-rule-error-list";

pub const FIELD_KEY_PATTERN: &str = "silence_key_pattern";
pub const FIELD_EVENT_TYPE: &str = "silence_event_type";
pub const FIELD_HOST_PATTERN: &str = "silence_host_pattern";
pub const FIELD_IS_ACTIVE: &str = "silence_is_active";
pub const FIELD_RULE_ID: &str = "silence_rule_id";

pub const ADD_TITLE: &str = "Add New Rule";
pub const ADD_LABEL: &str = "Add Rule";
pub const EDIT_TITLE: &str = "Edit Rule";
pub const EDIT_LABEL: &str = "Update Rule";
const SAVING_LABEL: &str = "Saving...";

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this silence rule?";
const LOADING_TEXT: &str = "Loading rules...";
const LOAD_ERROR_TEXT: &str = "Error loading rules";
const SAVE_ERROR_TEXT: &str = "An error occurred while saving.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelState {
    Closed,
    Adding,
    Editing(u64),
}

/// Everything a click inside the panel can ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelAction {
    TogglePanel,
    Edit(u64),
    Delete(u64),
    Toggle(u64),
    CancelEdit,
    Submit,
}

impl PanelAction {
    /// Parses the `data-*-rule` attributes carried by rendered rule controls.
    pub fn from_data_attribute(name: &str, value: &str) -> Option<Self> {
        let rule_id = value.trim().parse::<u64>().ok()?;
        match name {
            "data-edit-rule" => Some(PanelAction::Edit(rule_id)),
            "data-delete-rule" => Some(PanelAction::Delete(rule_id)),
            "data-toggle-rule" => Some(PanelAction::Toggle(rule_id)),
            _ => None,
        }
    }

    /// Resolves a click on `target` by walking up to the nearest control.
    pub fn from_click(doc: &Document, target: &str) -> Option<Self> {
        let id = doc.closest(target, |id, element| action_for(id, element).is_some())?;
        action_for(&id, doc.get(&id)?)
    }
}

fn action_for(id: &str, element: &Element) -> Option<PanelAction> {
    if element.has_class(PANEL_BUTTON_CLASS) {
        return Some(PanelAction::TogglePanel);
    }
    for name in ["data-edit-rule", "data-delete-rule", "data-toggle-rule"] {
        if let Some(value) = element.attribute(name) {
            return PanelAction::from_data_attribute(name, value);
        }
    }
    if id == CANCEL_BUTTON {
        return Some(PanelAction::CancelEdit);
    }
    None
}

#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved,
    Invalid(Vec<String>),
    Failed,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    Done,
    /// Aborted before any request (bad CSRF token, unknown rule, declined).
    Skipped,
    Failed(String),
}

/// Form snapshot taken when a save starts; the button stays disabled until
/// `finish_submit` runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSubmit {
    pub action: String,
    pub fields: Vec<(String, String)>,
    pub csrf_token: Option<String>,
    button: Option<String>,
    original_label: String,
}

/// Optimistic flip that has been rendered but not yet confirmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingToggle {
    pub rule_id: u64,
    pub previous: bool,
    pub csrf_token: String,
}

/// Sidebar CRUD for silence rules. `rules` is a cache of the server list:
/// replaced wholesale on every successful load and patched in place only by
/// the toggle path.
pub struct SilenceRulePanel {
    rules: Vec<SilenceRule>,
    state: PanelState,
}

impl Default for SilenceRulePanel {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            state: PanelState::Closed,
        }
    }
}

impl SilenceRulePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[SilenceRule] {
        &self.rules
    }

    pub fn rule(&self, rule_id: u64) -> Option<&SilenceRule> {
        self.rules.iter().find(|rule| rule.id == rule_id)
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn editing_rule_id(&self) -> Option<u64> {
        match self.state {
            PanelState::Editing(rule_id) => Some(rule_id),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state != PanelState::Closed
    }

    pub async fn dispatch<A, H>(&mut self, page: &mut Page<H>, api: &A, action: PanelAction)
    where
        A: DashboardApi,
        H: Host,
    {
        match action {
            PanelAction::TogglePanel => self.toggle_panel(page, api).await,
            PanelAction::Edit(rule_id) => {
                self.edit(&mut page.doc, rule_id);
            }
            PanelAction::Delete(rule_id) => {
                if page.host.confirm(DELETE_PROMPT) {
                    self.delete(page, api, rule_id).await;
                }
            }
            PanelAction::Toggle(rule_id) => {
                self.toggle_rule(page, api, rule_id).await;
            }
            PanelAction::CancelEdit => self.cancel_edit(&mut page.doc),
            PanelAction::Submit => {
                self.submit(page, api).await;
            }
        }
    }

    /// Opening loads the list; closing discards any edit in progress.
    pub async fn toggle_panel<A, H>(&mut self, page: &mut Page<H>, api: &A)
    where
        A: DashboardApi,
        H: Host,
    {
        if self.is_open() {
            page.doc.add_class(PANEL, "hidden");
            self.state = PanelState::Closed;
            self.reset_form(&mut page.doc);
        } else {
            self.open(page, api).await;
        }
    }

    /// Shows the panel in add mode and loads the list. Returns whether the
    /// load succeeded.
    pub async fn open<A, H>(&mut self, page: &mut Page<H>, api: &A) -> bool
    where
        A: DashboardApi,
        H: Host,
    {
        page.doc.remove_class(PANEL, "hidden");
        self.state = PanelState::Adding;
        self.reset_form(&mut page.doc);
        self.reload(&mut page.doc, api).await
    }

    pub async fn reload<A: DashboardApi>(&mut self, doc: &mut Document, api: &A) -> bool {
        doc.set_inner_html(CONTAINER, &ui::render_notice(LOADING_TEXT, Tone::Muted));
        match api.list_rules().await {
            Ok(list) => {
                self.rules = list.rules;
                self.render(doc);
                true
            }
            Err(err) => {
                tracing::error!("Error loading silence rules: {err}");
                doc.set_inner_html(CONTAINER, &ui::render_notice(LOAD_ERROR_TEXT, Tone::Error));
                false
            }
        }
    }

    pub fn render(&self, doc: &mut Document) {
        doc.set_inner_html(CONTAINER, &ui::render_rule_list(&self.rules));
    }

    /// Loads a cached rule into the form and retargets it at the edit endpoint.
    pub fn edit(&mut self, doc: &mut Document, rule_id: u64) -> bool {
        if !self.is_open() {
            tracing::debug!(rule_id, "Ignoring edit while the panel is closed");
            return false;
        }
        let Some(rule) = self.rule(rule_id).cloned() else {
            tracing::error!(rule_id, "Rule not found");
            return false;
        };

        doc.set_value(FIELD_KEY_PATTERN, &rule.key_pattern);
        doc.set_value(FIELD_EVENT_TYPE, rule.event_type.as_str());
        doc.set_value(FIELD_HOST_PATTERN, &rule.host_pattern);
        doc.set_checked(FIELD_IS_ACTIVE, rule.is_active);
        doc.set_value(FIELD_RULE_ID, &rule_id.to_string());

        doc.set_text(FORM_TITLE, EDIT_TITLE);
        doc.set_text(SUBMIT_TEXT, EDIT_LABEL);
        doc.remove_class(CANCEL_BUTTON, "hidden");
        doc.set_attribute(FORM, "action", &rules::edit_path(rule_id));
        doc.scroll_into_view(FORM);

        self.state = PanelState::Editing(rule_id);
        true
    }

    pub fn cancel_edit(&mut self, doc: &mut Document) {
        self.reset_form(doc);
    }

    fn reset_form(&mut self, doc: &mut Document) {
        if self.is_open() {
            self.state = PanelState::Adding;
        }

        doc.set_value(FIELD_KEY_PATTERN, "");
        doc.set_value(FIELD_EVENT_TYPE, EventType::All.as_str());
        doc.set_value(FIELD_HOST_PATTERN, "*");
        doc.set_checked(FIELD_IS_ACTIVE, true);
        doc.set_value(FIELD_RULE_ID, "");

        doc.set_text(FORM_TITLE, ADD_TITLE);
        doc.set_text(SUBMIT_TEXT, ADD_LABEL);
        doc.add_class(CANCEL_BUTTON, "hidden");
        doc.set_attribute(FORM, "action", rules::CREATE_PATH);
        if let Some(button) = submit_button(doc) {
            doc.set_disabled(&button, false);
        }

        hide_form_errors(doc);
    }

    /// Posts the form to its current target. Success reloads the list,
    /// resets to add mode and reloads the hosting page; failure keeps the
    /// form as entered.
    pub async fn submit<A, H>(&mut self, page: &mut Page<H>, api: &A) -> SubmitOutcome
    where
        A: DashboardApi,
        H: Host,
    {
        let pending = self.begin_submit(&mut page.doc);
        let result = api
            .submit_rule(
                &pending.action,
                &pending.fields,
                pending.csrf_token.as_deref(),
            )
            .await;
        self.finish_submit(page, api, pending, result).await
    }

    /// Serialises the form and puts the submit button into its saving state.
    pub fn begin_submit(&self, doc: &mut Document) -> PendingSubmit {
        let action = doc
            .attribute(FORM, "action")
            .map(str::to_string)
            .unwrap_or_else(|| match self.state {
                PanelState::Editing(rule_id) => rules::edit_path(rule_id),
                _ => rules::CREATE_PATH.to_string(),
            });
        let fields = doc.form_data(FORM);
        let csrf_token = csrf::find_token(doc, Some(FORM));

        let button = submit_button(doc);
        let original_label = doc.text(SUBMIT_TEXT).unwrap_or(ADD_LABEL).to_string();
        doc.set_text(SUBMIT_TEXT, SAVING_LABEL);
        if let Some(button) = &button {
            doc.set_disabled(button, true);
        }

        PendingSubmit {
            action,
            fields,
            csrf_token,
            button,
            original_label,
        }
    }

    pub async fn finish_submit<A, H>(
        &mut self,
        page: &mut Page<H>,
        api: &A,
        pending: PendingSubmit,
        result: Result<SubmitReply, ApiError>,
    ) -> SubmitOutcome
    where
        A: DashboardApi,
        H: Host,
    {
        let action = &pending.action;
        let outcome = match result {
            Ok(reply) if reply.success => {
                tracing::info!(%action, "Silence rule saved");
                self.reload(&mut page.doc, api).await;
                self.reset_form(&mut page.doc);
                page.host.reload();
                return SubmitOutcome::Saved;
            }
            Ok(reply) => {
                let mut messages = reply
                    .errors
                    .map(|errors| errors.messages())
                    .unwrap_or_default();
                if messages.is_empty() {
                    messages.push(SAVE_ERROR_TEXT.to_string());
                }
                tracing::warn!(%action, ?messages, "Silence rule rejected");
                SubmitOutcome::Invalid(messages)
            }
            Err(err) => {
                tracing::error!(%action, "Error saving silence rule: {err}");
                SubmitOutcome::Failed
            }
        };

        let messages = match &outcome {
            SubmitOutcome::Invalid(messages) => messages.clone(),
            _ => vec![SAVE_ERROR_TEXT.to_string()],
        };
        show_form_errors(&mut page.doc, &messages);
        page.doc.set_text(SUBMIT_TEXT, &pending.original_label);
        if let Some(button) = &pending.button {
            page.doc.set_disabled(button, false);
        }
        outcome
    }

    pub async fn delete<A, H>(&mut self, page: &mut Page<H>, api: &A, rule_id: u64) -> MutationOutcome
    where
        A: DashboardApi,
        H: Host,
    {
        let csrf_token = match csrf::validated_token(&page.doc, Some(FORM)) {
            Ok(token) => token,
            Err(err) => {
                page.host.alert(&err.to_string());
                return MutationOutcome::Skipped;
            }
        };

        let reason = match api.delete_rule(rule_id, &csrf_token).await {
            Ok(reply) if reply.success => {
                tracing::info!(rule_id, "Silence rule deleted");
                self.reload(&mut page.doc, api).await;
                page.host.reload();
                return MutationOutcome::Done;
            }
            Ok(reply) => reply.message.unwrap_or_else(|| "Unknown error".to_string()),
            Err(err) => {
                tracing::error!(rule_id, "Error deleting silence rule: {err}");
                err.to_string()
            }
        };
        page.host.alert(&format!("Error deleting rule: {reason}"));
        MutationOutcome::Failed(reason)
    }

    /// Flips the cached flag and renders before anything is sent.
    pub fn begin_toggle<H: Host>(
        &mut self,
        page: &mut Page<H>,
        rule_id: u64,
    ) -> Option<PendingToggle> {
        let csrf_token = match csrf::validated_token(&page.doc, Some(FORM)) {
            Ok(token) => token,
            Err(err) => {
                page.host.alert(&err.to_string());
                return None;
            }
        };
        let Some(rule) = self.rules.iter_mut().find(|rule| rule.id == rule_id) else {
            tracing::error!(rule_id, "Rule not found");
            return None;
        };

        let previous = rule.is_active;
        rule.is_active = !previous;
        self.render(&mut page.doc);
        Some(PendingToggle {
            rule_id,
            previous,
            csrf_token,
        })
    }

    /// Reconciles with the server's value on success, rolls back otherwise.
    /// Patches whichever rule with that id is cached when the reply lands.
    pub fn finish_toggle<H: Host>(
        &mut self,
        page: &mut Page<H>,
        pending: PendingToggle,
        result: Result<ToggleReply, ApiError>,
    ) -> MutationOutcome {
        let failure = match result {
            Ok(reply) if reply.success => {
                if let Some(rule) = self.rules.iter_mut().find(|r| r.id == pending.rule_id) {
                    rule.is_active = reply.is_active.unwrap_or(!pending.previous);
                }
                self.render(&mut page.doc);
                return MutationOutcome::Done;
            }
            Ok(reply) => reply.message.unwrap_or_else(|| "Unknown error".to_string()),
            Err(err) => {
                tracing::error!(rule_id = pending.rule_id, "Error toggling silence rule: {err}");
                err.to_string()
            }
        };

        if let Some(rule) = self.rules.iter_mut().find(|r| r.id == pending.rule_id) {
            rule.is_active = pending.previous;
        }
        self.render(&mut page.doc);
        page.host.alert(&format!("Error toggling rule: {failure}"));
        MutationOutcome::Failed(failure)
    }

    pub async fn toggle_rule<A, H>(
        &mut self,
        page: &mut Page<H>,
        api: &A,
        rule_id: u64,
    ) -> MutationOutcome
    where
        A: DashboardApi,
        H: Host,
    {
        let Some(pending) = self.begin_toggle(page, rule_id) else {
            return MutationOutcome::Skipped;
        };
        let result = api.toggle_rule(rule_id, &pending.csrf_token).await;
        self.finish_toggle(page, pending, result)
    }
}

fn submit_button(doc: &Document) -> Option<String> {
    doc.find_descendant(FORM, |el| {
        el.tag() == Tag::Button && el.attribute("type") == Some("submit")
    })
}

fn show_form_errors(doc: &mut Document, messages: &[String]) {
    doc.remove_children(ERROR_LIST);
    for (index, message) in messages.iter().enumerate() {
        doc.append(
            Some(ERROR_LIST),
            &format!("{ERROR_LIST}-{index}"),
            Element::new(Tag::ListItem).text(message),
        );
    }
    doc.remove_class(FORM_ERRORS, "hidden");
}

fn hide_form_errors(doc: &mut Document) {
    doc.add_class(FORM_ERRORS, "hidden");
}
