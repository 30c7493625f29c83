use crate::modal::Variant;
use crate::rules::SilenceRule;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;

const EDIT_ICON_PATH: &str = "M16.862 4.487l1.687-1.688a1.875 1.875 0 112.652 2.652L10.582 16.07a4.5 4.5 0 01-1.897 1.13L6 18l.8-2.685a4.5 4.5 0 011.13-1.897l8.932-8.931zm0 0L19.5 7.125M18 14v4.75A2.25 2.25 0 0115.75 21H5.25A2.25 2.25 0 013 18.75V8.25A2.25 2.25 0 015.25 6H10";
const DELETE_ICON_PATH: &str = "M19 7l-.867 12.142A2 2 0 0116.138 21H7.862a2 2 0 01-1.995-1.858L5 7m5 4v6m4-6v6m1-10V4a1 1 0 00-1-1h-4a1 1 0 00-1 1v3M4 7h16";
const WARNING_ICON_PATH: &str = "M12 9v3.75m-9.303 3.376c-.866 1.5.217 3.374 1.948 3.374h14.71c1.73 0 2.813-1.874 1.948-3.374L13.949 3.378c-.866-1.5-3.032-1.5-3.898 0L2.697 16.126zM12 15.75h.007v.008H12v-.008z";
const INFO_ICON_PATH: &str = "M11.25 11.25l.041-.02a.75.75 0 011.063.852l-.708 2.836a.75.75 0 001.063.853l.041-.021M21 12a9 9 0 11-18 0 9 9 0 0118 0zm-9-3.75h.008v.008H12V8.25z";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Muted,
    Error,
}

#[derive(Props, Clone, PartialEq)]
pub struct RuleListProps {
    pub rules: Vec<SilenceRule>,
}

#[derive(Props, Clone, PartialEq)]
pub struct RuleCardProps {
    pub rule: SilenceRule,
}

#[derive(Props, Clone, PartialEq)]
pub struct NoticeProps {
    pub text: String,
    pub tone: Tone,
}

#[derive(Props, Clone, PartialEq)]
pub struct ModalIconProps {
    pub variant: Variant,
}

#[derive(Props, Clone, PartialEq)]
pub struct DeleteDeviceProps {
    pub hostname: String,
}

/// Markup for `silence-rules-container`. Every rule field goes through the
/// renderer's escaping, so patterns can never inject markup.
pub fn render_rule_list(rules: &[SilenceRule]) -> String {
    let mut dom = VirtualDom::new_with_props(
        RuleList,
        RuleListProps {
            rules: rules.to_vec(),
        },
    );
    rebuild_and_render(&mut dom)
}

pub fn render_notice(text: &str, tone: Tone) -> String {
    let mut dom = VirtualDom::new_with_props(
        Notice,
        NoticeProps {
            text: text.to_string(),
            tone,
        },
    );
    rebuild_and_render(&mut dom)
}

pub fn render_modal_icon(variant: Variant) -> String {
    let mut dom = VirtualDom::new_with_props(ModalIcon, ModalIconProps { variant });
    rebuild_and_render(&mut dom)
}

pub fn render_delete_device_message(hostname: &str) -> String {
    let mut dom = VirtualDom::new_with_props(
        DeleteDeviceMessage,
        DeleteDeviceProps {
            hostname: hostname.to_string(),
        },
    );
    rebuild_and_render(&mut dom)
}

fn rebuild_and_render(dom: &mut VirtualDom) -> String {
    // Build the tree before rendering to avoid SSR panics.
    let mut noop = NoOpMutations {};
    let _ = dom.rebuild(&mut noop);
    dioxus_ssr::render(dom)
}

#[component]
fn RuleList(props: RuleListProps) -> Element {
    if props.rules.is_empty() {
        return rsx! {
            Notice { text: "No silence rules configured. Add one below.", tone: Tone::Muted }
        };
    }
    rsx! {
        for rule in props.rules.iter() {
            RuleCard { key: "{rule.id}", rule: rule.clone() }
        }
    }
}

#[component]
fn RuleCard(props: RuleCardProps) -> Element {
    let rule = &props.rule;
    let dimmed = if rule.is_active { "" } else { "opacity-60" };
    let track = if rule.is_active { "bg-blue-600" } else { "bg-gray-200" };
    let knob = if rule.is_active {
        "translate-x-full rtl:-translate-x-full"
    } else {
        ""
    };
    let toggle_title = if rule.is_active { "Deactivate" } else { "Activate" };
    let label = rule.event_type.label().to_string();

    rsx! {
        div { class: "border border-gray-200 rounded-lg p-3 {dimmed}", "data-rule-id": "{rule.id}",
            div { class: "flex justify-between items-start mb-2",
                div { class: "flex-1",
                    div { class: "font-semibold text-gray-900", "{rule.key_pattern}" }
                    div { class: "text-sm text-gray-600 mt-1",
                        span { class: "inline-block px-2 py-1 rounded text-xs font-medium bg-blue-100 text-blue-800 mr-2",
                            "{label}"
                        }
                        span { class: "text-gray-500", "Host: {rule.host_pattern}" }
                    }
                }
                div { class: "flex items-center gap-2",
                    button {
                        r#type: "button",
                        class: "inline-flex items-center cursor-pointer focus:outline-none",
                        title: "{toggle_title}",
                        "data-toggle-rule": "{rule.id}",
                        div { class: "relative w-11 h-6 {track} rounded-full transition-colors",
                            div { class: "absolute top-[2px] start-[2px] bg-white border border-gray-300 rounded-full h-5 w-5 transition-transform {knob}" }
                        }
                    }
                    button {
                        r#type: "button",
                        class: "text-gray-600 hover:text-gray-800",
                        title: "Edit",
                        "data-edit-rule": "{rule.id}",
                        svg { "class": "w-5 h-5", "fill": "none", "stroke": "currentColor", "viewBox": "0 0 24 24",
                            path { "stroke-linecap": "round", "stroke-linejoin": "round", "stroke-width": "2", "d": EDIT_ICON_PATH }
                        }
                    }
                    button {
                        r#type: "button",
                        class: "text-red-600 hover:text-red-800",
                        title: "Delete",
                        "data-delete-rule": "{rule.id}",
                        svg { "class": "w-5 h-5", "fill": "none", "stroke": "currentColor", "viewBox": "0 0 24 24",
                            path { "stroke-linecap": "round", "stroke-linejoin": "round", "stroke-width": "2", "d": DELETE_ICON_PATH }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn Notice(props: NoticeProps) -> Element {
    let color = match props.tone {
        Tone::Muted => "text-gray-500",
        Tone::Error => "text-red-500",
    };
    rsx! {
        p { class: "text-sm {color}", "{props.text}" }
    }
}

#[component]
fn ModalIcon(props: ModalIconProps) -> Element {
    let d = match props.variant {
        Variant::Danger | Variant::Warning => WARNING_ICON_PATH,
        Variant::Info => INFO_ICON_PATH,
    };
    rsx! {
        svg { "class": "h-6 w-6", "fill": "none", "viewBox": "0 0 24 24", "stroke-width": "1.5", "stroke": "currentColor",
            path { "stroke-linecap": "round", "stroke-linejoin": "round", "d": d }
        }
    }
}

#[component]
fn DeleteDeviceMessage(props: DeleteDeviceProps) -> Element {
    rsx! {
        "Are you sure you want to delete device "
        strong { "\"{props.hostname}\"" }
        "?"
        br {}
        br {}
        "This will permanently remove the device and all its reports."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::EventType;

    fn rule(id: u64, key: &str, event_type: EventType, active: bool) -> SilenceRule {
        SilenceRule {
            id,
            key_pattern: key.to_string(),
            event_type,
            host_pattern: "web-*".to_string(),
            is_active: active,
        }
    }

    #[test]
    fn empty_list_shows_hint() {
        let html = render_rule_list(&[]);
        assert!(html.contains("No silence rules configured. Add one below."));
        assert!(html.contains("text-gray-500"));
    }

    #[test]
    fn rules_render_labels_and_controls() {
        let html = render_rule_list(&[
            rule(1, "db-*", EventType::Changed, true),
            rule(2, "pkg", EventType::Other("renamed".into()), false),
        ]);
        assert!(html.contains("Changed"));
        assert!(html.contains("renamed"));
        assert!(html.contains("Host: web-*"));
        assert!(html.contains("data-toggle-rule=\"1\""));
        assert!(html.contains("data-edit-rule=\"2\""));
        assert!(html.contains("data-delete-rule=\"2\""));
        assert!(html.contains("title=\"Deactivate\""));
        assert!(html.contains("title=\"Activate\""));
        assert_eq!(html.matches("opacity-60").count(), 1);
    }

    #[test]
    fn patterns_are_escaped() {
        let html = render_rule_list(&[rule(
            3,
            "<script>alert(1)</script>",
            EventType::All,
            true,
        )]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&#60;script&#62;alert(1)&#60;/script&#62;"));

        let html = render_rule_list(&[SilenceRule {
            host_pattern: "<img src=x onerror=alert(2)>".to_string(),
            ..rule(4, "\"><b>h</b>", EventType::All, true)
        }]);
        assert!(!html.contains("<img"));
        assert!(!html.contains("<b>h</b>"));
        assert!(html.contains("&#60;b&#62;h&#60;/b&#62;"));
    }

    #[test]
    fn hostname_is_escaped_in_delete_message() {
        let html = render_delete_device_message("<b>srv</b>");
        assert!(html.contains("<strong>"));
        assert!(!html.contains("<b>srv</b>"));
        assert!(html.contains("permanently remove the device"));
    }

    #[test]
    fn error_notice_uses_error_tone() {
        let html = render_notice("Error loading rules", Tone::Error);
        assert!(html.contains("text-red-500"));
        assert!(html.contains("Error loading rules"));
    }
}
