use crate::dom::Document;
use crate::ui;
use std::time::Duration;

pub const BACKDROP: &str = "modal-backdrop";
pub const CONTAINER: &str = "modal-container";
pub const DIALOG: &str = "modal-dialog";
pub const ICON: &str = "modal-icon";
pub const TITLE: &str = "modal-title";
pub const MESSAGE: &str = "modal-message";
pub const CONFIRM_BUTTON: &str = "modal-confirm-button";
pub const CANCEL_BUTTON: &str = "modal-cancel-button";

/// Lets the reveal transition start before focus moves into the dialog.
pub const FOCUS_DELAY: Duration = Duration::from_millis(100);

const ICON_BASE: &str = "mx-auto flex h-12 w-12 flex-shrink-0 items-center justify-center rounded-full sm:mx-0 sm:h-10 sm:w-10";
const CONFIRM_BASE: &str = "inline-flex w-full justify-center rounded-md px-3 py-2 text-sm font-semibold text-white shadow-sm sm:ml-3 sm:w-auto";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Danger,
    Warning,
    Info,
}

impl Variant {
    /// Unknown names fall back to `Danger`.
    pub fn parse(name: &str) -> Self {
        match name {
            "warning" => Variant::Warning,
            "info" => Variant::Info,
            _ => Variant::Danger,
        }
    }

    fn icon_classes(self) -> &'static str {
        match self {
            Variant::Danger => "bg-red-100 text-red-600",
            Variant::Warning => "bg-yellow-100 text-yellow-600",
            Variant::Info => "bg-blue-100 text-blue-600",
        }
    }

    fn confirm_classes(self) -> &'static str {
        match self {
            Variant::Danger => "bg-red-600 hover:bg-red-500",
            Variant::Warning => "bg-yellow-600 hover:bg-yellow-500",
            Variant::Info => "bg-blue-600 hover:bg-blue-500",
        }
    }
}

pub struct ModalOptions<A> {
    pub title: String,
    /// Inserted as markup; callers escape anything user-supplied.
    pub message: String,
    pub confirm_text: String,
    pub cancel_text: String,
    pub variant: Variant,
    pub on_confirm: A,
    pub on_cancel: Option<A>,
}

impl<A> ModalOptions<A> {
    pub fn new(title: &str, message: &str, on_confirm: A) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            confirm_text: "Confirm".to_string(),
            cancel_text: "Cancel".to_string(),
            variant: Variant::Danger,
            on_confirm,
            on_cancel: None,
        }
    }

    pub fn confirm_text(mut self, text: &str) -> Self {
        self.confirm_text = text.to_string();
        self
    }

    pub fn cancel_text(mut self, text: &str) -> Self {
        self.cancel_text = text.to_string();
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn on_cancel(mut self, action: A) -> Self {
        self.on_cancel = Some(action);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
    Tab,
    Enter,
    Other(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum KeyOutcome<A> {
    /// Modal hidden or key not part of the contract.
    Ignored,
    /// Focus was kept inside the dialog; the browser default must be suppressed.
    FocusTrapped,
    Cancelled(Option<A>),
    Confirmed(Option<A>),
}

impl<A> KeyOutcome<A> {
    pub fn prevent_default(&self) -> bool {
        matches!(self, KeyOutcome::FocusTrapped | KeyOutcome::Confirmed(_))
    }
}

/// The single page-wide confirmation dialog. Pending callbacks are plain
/// values handed back by `confirm`/`cancel`, each at most once per `show`.
pub struct ModalController<A> {
    on_confirm: Option<A>,
    on_cancel: Option<A>,
    previous_focus: Option<String>,
    first_focusable: Option<String>,
    last_focusable: Option<String>,
}

impl<A> Default for ModalController<A> {
    fn default() -> Self {
        Self {
            on_confirm: None,
            on_cancel: None,
            previous_focus: None,
            first_focusable: None,
            last_focusable: None,
        }
    }
}

impl<A> ModalController<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self, doc: &Document) -> bool {
        doc.exists(CONTAINER) && !doc.has_class(CONTAINER, "hidden")
    }

    pub fn show(&mut self, doc: &mut Document, options: ModalOptions<A>) {
        self.on_confirm = Some(options.on_confirm);
        self.on_cancel = options.on_cancel;

        doc.set_text(TITLE, &options.title);
        doc.set_inner_html(MESSAGE, &options.message);
        doc.set_class_name(
            ICON,
            &format!("{ICON_BASE} {}", options.variant.icon_classes()),
        );
        doc.set_inner_html(ICON, &ui::render_modal_icon(options.variant));
        doc.set_class_name(
            CONFIRM_BUTTON,
            &format!("{CONFIRM_BASE} {}", options.variant.confirm_classes()),
        );
        doc.set_text(CONFIRM_BUTTON, &options.confirm_text);
        doc.set_text(CANCEL_BUTTON, &options.cancel_text);

        // A modal replacing an open one keeps the focus target of the first.
        if !self.is_open(doc) {
            self.previous_focus = doc.active_element().map(str::to_string);
        }

        doc.remove_class(BACKDROP, "hidden");
        doc.remove_class(CONTAINER, "hidden");
        doc.set_body_scroll_locked(true);

        let focusable = doc.focusable_descendants(DIALOG);
        self.first_focusable = focusable.first().cloned();
        self.last_focusable = focusable.last().cloned();

        doc.focus_after(CONFIRM_BUTTON, FOCUS_DELAY);
    }

    /// Safe to call when nothing is open.
    pub fn hide(&mut self, doc: &mut Document) {
        doc.add_class(BACKDROP, "hidden");
        doc.add_class(CONTAINER, "hidden");
        doc.set_body_scroll_locked(false);
        doc.cancel_timers(CONFIRM_BUTTON);

        if let Some(previous) = self.previous_focus.take() {
            doc.focus(&previous);
        }

        self.on_confirm = None;
        self.on_cancel = None;
        self.first_focusable = None;
        self.last_focusable = None;
    }

    pub fn confirm(&mut self, doc: &mut Document) -> Option<A> {
        let action = self.on_confirm.take();
        self.hide(doc);
        action
    }

    pub fn cancel(&mut self, doc: &mut Document) -> Option<A> {
        let action = self.on_cancel.take();
        self.hide(doc);
        action
    }

    /// Clicks on the backdrop take the cancel path. `None` when the click
    /// is not a backdrop click on an open modal.
    pub fn handle_backdrop_click(&mut self, doc: &mut Document, target: &str) -> Option<Option<A>> {
        if target != BACKDROP || !self.is_open(doc) {
            return None;
        }
        Some(self.cancel(doc))
    }

    /// Global keydown handler; a no-op while the modal is hidden.
    pub fn handle_key(&mut self, doc: &mut Document, event: &KeyEvent) -> KeyOutcome<A> {
        if !self.is_open(doc) {
            return KeyOutcome::Ignored;
        }

        match event.key {
            Key::Escape => KeyOutcome::Cancelled(self.cancel(doc)),
            Key::Tab => self.trap_focus(doc, event.shift),
            Key::Enter if doc.active_element() == Some(CONFIRM_BUTTON) => {
                KeyOutcome::Confirmed(self.confirm(doc))
            }
            _ => KeyOutcome::Ignored,
        }
    }

    fn trap_focus(&mut self, doc: &mut Document, backwards: bool) -> KeyOutcome<A> {
        let (Some(first), Some(last)) = (self.first_focusable.clone(), self.last_focusable.clone())
        else {
            return KeyOutcome::Ignored;
        };
        let active = doc.active_element().map(str::to_string);
        let inside = active
            .as_deref()
            .is_some_and(|id| doc.contains(DIALOG, id));

        let target = match (backwards, active.as_deref()) {
            (_, _) if !inside => Some(if backwards { last } else { first }),
            (true, Some(id)) if id == first => Some(last),
            (false, Some(id)) if id == last => Some(first),
            _ => None,
        };

        match target {
            Some(id) => {
                doc.focus(&id);
                KeyOutcome::FocusTrapped
            }
            None => KeyOutcome::Ignored,
        }
    }
}
