//! Page skeleton as the server renders it: the element ids the components
//! bind to, before any script has run.

use crate::csrf::CSRF_FIELD;
use crate::devices::{
    ACTIONS_BUTTON, ACTIONS_MENU, ROW_ATTRIBUTE, SEARCH_CONTAINER, SEARCH_INPUT, SEARCH_TOGGLE,
};
use crate::dom::{Document, Element, Tag};
use crate::modal;
use crate::panel;
use crate::rules::CREATE_PATH;

pub const DEVICE_TABLE_BODY: &str = "device-table-body";
pub const PANEL_CSRF_FIELD: &str = "silence-rule-csrf";

pub fn dashboard(device_names: &[&str], csrf_token: Option<&str>) -> Document {
    let mut doc = Document::new();
    add_modal(&mut doc);
    add_device_list(&mut doc, device_names);
    add_silence_panel(&mut doc, csrf_token);
    doc
}

fn add_modal(doc: &mut Document) {
    doc.append(
        None,
        modal::BACKDROP,
        Element::new(Tag::Div).class("fixed inset-0 bg-gray-500/75 transition-opacity hidden"),
    );
    doc.append(
        None,
        modal::CONTAINER,
        Element::new(Tag::Div).class("fixed inset-0 z-50 overflow-y-auto hidden"),
    );
    doc.append(
        Some(modal::CONTAINER),
        modal::DIALOG,
        Element::new(Tag::Div)
            .class("relative transform overflow-hidden rounded-lg bg-white")
            .attr("role", "dialog")
            .attr("aria-modal", "true"),
    );
    doc.append(Some(modal::DIALOG), modal::ICON, Element::new(Tag::Div));
    doc.append(Some(modal::DIALOG), modal::TITLE, Element::new(Tag::Heading));
    doc.append(Some(modal::DIALOG), modal::MESSAGE, Element::new(Tag::Div));
    doc.append(
        Some(modal::DIALOG),
        modal::CONFIRM_BUTTON,
        Element::new(Tag::Button).attr("type", "button"),
    );
    doc.append(
        Some(modal::DIALOG),
        modal::CANCEL_BUTTON,
        Element::new(Tag::Button).attr("type", "button"),
    );
}

fn add_device_list(doc: &mut Document, device_names: &[&str]) {
    doc.append(
        None,
        ACTIONS_BUTTON,
        Element::new(Tag::Button).attr("type", "button"),
    );
    doc.append(
        None,
        ACTIONS_MENU,
        Element::new(Tag::Div).class("absolute right-0 z-10 mt-2 hidden"),
    );
    doc.append(
        Some(ACTIONS_MENU),
        "device-delete-action",
        Element::new(Tag::Button).attr("type", "button"),
    );

    doc.append(
        None,
        SEARCH_TOGGLE,
        Element::new(Tag::Button).attr("type", "button"),
    );
    doc.append(
        Some(SEARCH_TOGGLE),
        "device-search-toggle-icon",
        Element::new(Tag::Span),
    );
    doc.append(
        None,
        SEARCH_CONTAINER,
        Element::new(Tag::Div).class("max-w-0 opacity-0 overflow-hidden transition-all duration-300"),
    );
    doc.append(
        Some(SEARCH_CONTAINER),
        SEARCH_INPUT,
        Element::new(Tag::Input)
            .attr("type", "search")
            .attr("placeholder", "Search devices"),
    );

    doc.append(None, "device-table", Element::new(Tag::Table));
    doc.append(Some("device-table"), DEVICE_TABLE_BODY, Element::new(Tag::Div));
    for (index, name) in device_names.iter().enumerate() {
        doc.append(
            Some(DEVICE_TABLE_BODY),
            &format!("device-row-{index}"),
            Element::new(Tag::Row).attr(ROW_ATTRIBUTE, name),
        );
    }
}

fn add_silence_panel(doc: &mut Document, csrf_token: Option<&str>) {
    doc.append(
        None,
        panel::PANEL,
        Element::new(Tag::Div).class("fixed inset-y-0 right-0 w-96 bg-white shadow-xl hidden"),
    );
    doc.append(
        Some(panel::PANEL),
        "silence-rules-panel-close",
        Element::new(Tag::Button)
            .class(panel::PANEL_BUTTON_CLASS)
            .attr("type", "button"),
    );
    doc.append(Some(panel::PANEL), panel::CONTAINER, Element::new(Tag::Div));

    doc.append(
        Some(panel::PANEL),
        panel::FORM,
        Element::new(Tag::Form)
            .attr("method", "post")
            .attr("action", CREATE_PATH),
    );
    doc.append(
        Some(panel::FORM),
        panel::FORM_TITLE,
        Element::new(Tag::Heading).text(panel::ADD_TITLE),
    );
    doc.append(
        Some(panel::FORM),
        PANEL_CSRF_FIELD,
        Element::new(Tag::Input)
            .attr("type", "hidden")
            .attr("name", CSRF_FIELD)
            .value(csrf_token.unwrap_or_default()),
    );
    doc.append(
        Some(panel::FORM),
        panel::FIELD_RULE_ID,
        Element::new(Tag::Input)
            .attr("type", "hidden")
            .attr("name", "rule_id"),
    );
    doc.append(
        Some(panel::FORM),
        panel::FIELD_KEY_PATTERN,
        Element::new(Tag::Input)
            .attr("type", "text")
            .attr("name", "key_pattern")
            .attr("maxlength", "255"),
    );
    doc.append(
        Some(panel::FORM),
        panel::FIELD_EVENT_TYPE,
        Element::new(Tag::Select)
            .attr("name", "event_type")
            .value("all"),
    );
    doc.append(
        Some(panel::FORM),
        panel::FIELD_HOST_PATTERN,
        Element::new(Tag::Input)
            .attr("type", "text")
            .attr("name", "host_pattern")
            .attr("maxlength", "255")
            .value("*"),
    );
    doc.append(
        Some(panel::FORM),
        panel::FIELD_IS_ACTIVE,
        Element::new(Tag::Input)
            .attr("type", "checkbox")
            .attr("name", "is_active")
            .checked(true),
    );
    doc.append(
        Some(panel::FORM),
        panel::FORM_ERRORS,
        Element::new(Tag::Div).class("rounded-md bg-red-50 p-3 hidden"),
    );
    doc.append(Some(panel::FORM_ERRORS), panel::ERROR_LIST, Element::new(Tag::List));
    doc.append(
        Some(panel::FORM),
        panel::CANCEL_BUTTON,
        Element::new(Tag::Button)
            .class("text-sm text-gray-600 hidden")
            .attr("type", "button"),
    );
    doc.append(
        Some(panel::FORM),
        "silence-rule-submit",
        Element::new(Tag::Button).attr("type", "submit"),
    );
    doc.append(
        Some("silence-rule-submit"),
        panel::SUBMIT_TEXT,
        Element::new(Tag::Span).text(panel::ADD_LABEL),
    );
}
