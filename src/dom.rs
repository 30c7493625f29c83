use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    Div,
    Span,
    Heading,
    Button,
    Anchor,
    Input,
    Select,
    TextArea,
    Form,
    Table,
    Row,
    List,
    ListItem,
}

#[derive(Clone, Debug)]
pub struct Element {
    tag: Tag,
    parent: Option<String>,
    children: Vec<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    inner_html: String,
    value: String,
    checked: bool,
    disabled: bool,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            parent: None,
            children: Vec::new(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: String::new(),
            inner_html: String::new(),
            value: String::new(),
            checked: false,
            disabled: false,
        }
    }

    pub fn class(mut self, class_name: &str) -> Self {
        self.classes = split_classes(class_name);
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Mirrors the focus-trap selector
    /// `button, [href], input, select, textarea, [tabindex]:not([tabindex="-1"])`.
    fn is_focusable(&self) -> bool {
        match self.tag {
            Tag::Button | Tag::Input | Tag::Select | Tag::TextArea => true,
            _ if self.attributes.contains_key("href") => true,
            _ => self
                .attribute("tabindex")
                .is_some_and(|index| index.trim() != "-1"),
        }
    }
}

fn split_classes(class_name: &str) -> Vec<String> {
    class_name.split_whitespace().map(str::to_string).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum TimerAction {
    Focus(String),
}

#[derive(Clone, Debug)]
struct Timer {
    due: Duration,
    action: TimerAction,
}

/// Element tree of the current page plus the page-level state the
/// components read and write (focus, scroll lock, cookie, timers).
#[derive(Clone, Debug, Default)]
pub struct Document {
    elements: HashMap<String, Element>,
    roots: Vec<String>,
    active: Option<String>,
    body_scroll_locked: bool,
    cookie: String,
    clock: Duration,
    timers: Vec<Timer>,
    scrolled: Vec<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `element` under `parent` (or at top level). An existing
    /// element with the same id is replaced together with its subtree.
    pub fn append(&mut self, parent: Option<&str>, id: &str, mut element: Element) {
        if self.elements.contains_key(id) {
            self.remove(id);
        }
        element.parent = parent.map(str::to_string);
        element.children.clear();
        match parent.and_then(|p| self.elements.get_mut(p)) {
            Some(parent_el) => parent_el.children.push(id.to_string()),
            None => {
                element.parent = None;
                self.roots.push(id.to_string());
            }
        }
        self.elements.insert(id.to_string(), element);
    }

    pub fn remove(&mut self, id: &str) {
        let Some(element) = self.elements.remove(id) else {
            return;
        };
        for child in element.children {
            self.remove(&child);
        }
        match element.parent.and_then(|p| self.elements.get_mut(&p)) {
            Some(parent) => parent.children.retain(|c| c != id),
            None => self.roots.retain(|c| c != id),
        }
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
    }

    pub fn remove_children(&mut self, id: &str) {
        let children = match self.elements.get(id) {
            Some(element) => element.children.clone(),
            None => return,
        };
        for child in children {
            self.remove(&child);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn children(&self, id: &str) -> Vec<String> {
        self.elements
            .get(id)
            .map(|el| el.children.clone())
            .unwrap_or_default()
    }

    /// All descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(element) = self.elements.get(id) {
            for child in &element.children {
                self.collect(child, &mut out);
            }
        }
        out
    }

    fn collect(&self, id: &str, out: &mut Vec<String>) {
        out.push(id.to_string());
        if let Some(element) = self.elements.get(id) {
            for child in &element.children {
                self.collect(child, out);
            }
        }
    }

    fn all_in_order(&self) -> Vec<String> {
        let mut out = Vec::new();
        for root in &self.roots {
            self.collect(root, &mut out);
        }
        out
    }

    pub fn focusable_descendants(&self, id: &str) -> Vec<String> {
        self.descendants(id)
            .into_iter()
            .filter(|child| self.elements.get(child).is_some_and(Element::is_focusable))
            .collect()
    }

    /// True when `id` is `ancestor` or lies somewhere beneath it.
    pub fn contains(&self, ancestor: &str, id: &str) -> bool {
        let mut cursor = Some(id.to_string());
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.elements.get(&current).and_then(|el| el.parent.clone());
        }
        false
    }

    /// Nearest element, starting at `id` and walking up, that satisfies `pred`.
    pub fn closest<F>(&self, id: &str, pred: F) -> Option<String>
    where
        F: Fn(&str, &Element) -> bool,
    {
        let mut cursor = Some(id.to_string());
        while let Some(current) = cursor {
            let element = self.elements.get(&current)?;
            if pred(&current, element) {
                return Some(current);
            }
            cursor = element.parent.clone();
        }
        None
    }

    pub fn elements_with_attribute(&self, name: &str) -> Vec<String> {
        self.all_in_order()
            .into_iter()
            .filter(|id| {
                self.elements
                    .get(id)
                    .is_some_and(|el| el.attributes.contains_key(name))
            })
            .collect()
    }

    pub fn elements_with_tag(&self, tag: Tag) -> Vec<String> {
        self.all_in_order()
            .into_iter()
            .filter(|id| self.elements.get(id).is_some_and(|el| el.tag == tag))
            .collect()
    }

    /// First element carrying `name="<name>"`, searched within `scope`
    /// when given, otherwise across the whole page.
    pub fn find_named(&self, scope: Option<&str>, name: &str) -> Option<String> {
        let candidates = match scope {
            Some(scope) => self.descendants(scope),
            None => self.all_in_order(),
        };
        candidates.into_iter().find(|id| {
            self.elements
                .get(id)
                .is_some_and(|el| el.attribute("name") == Some(name))
        })
    }

    pub fn find_descendant<F>(&self, scope: &str, pred: F) -> Option<String>
    where
        F: Fn(&Element) -> bool,
    {
        self.descendants(scope)
            .into_iter()
            .find(|id| self.elements.get(id).is_some_and(&pred))
    }

    /// Name/value pairs the browser would submit for `form`.
    pub fn form_data(&self, form: &str) -> Vec<(String, String)> {
        self.descendants(form)
            .into_iter()
            .filter_map(|id| {
                let el = self.elements.get(&id)?;
                let name = el.attribute("name")?;
                if el.disabled {
                    return None;
                }
                match (el.tag, el.attribute("type")) {
                    (Tag::Input, Some("checkbox" | "radio")) => el
                        .checked
                        .then(|| (name.to_string(), non_empty_or(&el.value, "on"))),
                    (Tag::Input | Tag::Select | Tag::TextArea, _) => {
                        Some((name.to_string(), el.value.clone()))
                    }
                    _ => None,
                }
            })
            .collect()
    }

    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.elements.get(id).is_some_and(|el| el.has_class(class))
    }

    pub fn add_class(&mut self, id: &str, class: &str) {
        if let Some(el) = self.elements.get_mut(id) {
            if !el.has_class(class) {
                el.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, id: &str, class: &str) {
        if let Some(el) = self.elements.get_mut(id) {
            el.classes.retain(|c| c != class);
        }
    }

    /// Returns whether the class is present afterwards.
    pub fn toggle_class(&mut self, id: &str, class: &str) -> bool {
        if self.has_class(id, class) {
            self.remove_class(id, class);
            false
        } else {
            self.add_class(id, class);
            self.has_class(id, class)
        }
    }

    pub fn set_class_name(&mut self, id: &str, class_name: &str) {
        if let Some(el) = self.elements.get_mut(id) {
            el.classes = split_classes(class_name);
        }
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|el| el.text.as_str())
    }

    pub fn set_text(&mut self, id: &str, text: &str) {
        if let Some(el) = self.elements.get_mut(id) {
            el.text = text.to_string();
        }
    }

    pub fn inner_html(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|el| el.inner_html.as_str())
    }

    pub fn set_inner_html(&mut self, id: &str, html: &str) {
        if let Some(el) = self.elements.get_mut(id) {
            el.inner_html = html.to_string();
        }
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|el| el.value.as_str())
    }

    pub fn set_value(&mut self, id: &str, value: &str) {
        if let Some(el) = self.elements.get_mut(id) {
            el.value = value.to_string();
        }
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.elements.get(id).is_some_and(|el| el.checked)
    }

    pub fn set_checked(&mut self, id: &str, checked: bool) {
        if let Some(el) = self.elements.get_mut(id) {
            el.checked = checked;
        }
    }

    pub fn is_disabled(&self, id: &str) -> bool {
        self.elements.get(id).is_some_and(|el| el.disabled)
    }

    pub fn set_disabled(&mut self, id: &str, disabled: bool) {
        if let Some(el) = self.elements.get_mut(id) {
            el.disabled = disabled;
        }
    }

    pub fn attribute(&self, id: &str, name: &str) -> Option<&str> {
        self.elements.get(id).and_then(|el| el.attribute(name))
    }

    pub fn set_attribute(&mut self, id: &str, name: &str, value: &str) {
        if let Some(el) = self.elements.get_mut(id) {
            el.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn active_element(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn focus(&mut self, id: &str) {
        if self.elements.contains_key(id) {
            self.active = Some(id.to_string());
        }
    }

    pub fn focus_after(&mut self, id: &str, delay: Duration) {
        self.timers.push(Timer {
            due: self.clock + delay,
            action: TimerAction::Focus(id.to_string()),
        });
    }

    /// Drops pending deferred focus requests aimed at `id`.
    pub fn cancel_timers(&mut self, id: &str) {
        self.timers
            .retain(|timer| !matches!(&timer.action, TimerAction::Focus(target) if target == id));
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Moves the clock forward and fires every timer that has come due,
    /// earliest first.
    pub fn advance(&mut self, elapsed: Duration) {
        self.clock += elapsed;
        let now = self.clock;
        let (mut due, pending): (Vec<Timer>, Vec<Timer>) =
            self.timers.drain(..).partition(|timer| timer.due <= now);
        self.timers = pending;
        due.sort_by_key(|timer| timer.due);
        for timer in due {
            match timer.action {
                TimerAction::Focus(id) => self.focus(&id),
            }
        }
    }

    pub fn body_scroll_locked(&self) -> bool {
        self.body_scroll_locked
    }

    pub fn set_body_scroll_locked(&mut self, locked: bool) {
        self.body_scroll_locked = locked;
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    pub fn set_cookie(&mut self, cookie: &str) {
        self.cookie = cookie.to_string();
    }

    pub fn scroll_into_view(&mut self, id: &str) {
        if self.elements.contains_key(id) {
            self.scrolled.push(id.to_string());
        }
    }

    pub fn last_scrolled(&self) -> Option<&str> {
        self.scrolled.last().map(String::as_str)
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Window-level effects: blocking dialogs and navigation.
pub trait Host {
    fn alert(&mut self, message: &str);
    fn confirm(&mut self, message: &str) -> bool;
    fn reload(&mut self);
    fn navigate(&mut self, url: &str);
}

pub struct Page<H> {
    pub doc: Document,
    pub host: H,
}

impl<H: Host> Page<H> {
    pub fn new(doc: Document, host: H) -> Self {
        Self { doc, host }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.append(None, "form", Element::new(Tag::Form));
        doc.append(
            Some("form"),
            "name",
            Element::new(Tag::Input).attr("name", "key_pattern").value("db-*"),
        );
        doc.append(
            Some("form"),
            "active",
            Element::new(Tag::Input)
                .attr("name", "is_active")
                .attr("type", "checkbox")
                .checked(true),
        );
        doc.append(
            Some("form"),
            "muted",
            Element::new(Tag::Input)
                .attr("name", "muted")
                .attr("type", "checkbox"),
        );
        doc.append(Some("form"), "wrapper", Element::new(Tag::Div));
        doc.append(
            Some("wrapper"),
            "submit",
            Element::new(Tag::Button).attr("type", "submit"),
        );
        doc.append(Some("wrapper"), "label", Element::new(Tag::Span).attr("tabindex", "-1"));
        doc.append(Some("wrapper"), "link", Element::new(Tag::Anchor).attr("href", "/"));
        doc
    }

    #[test]
    fn form_data_skips_unchecked_boxes() {
        let doc = sample();
        assert_eq!(
            doc.form_data("form"),
            vec![
                ("key_pattern".to_string(), "db-*".to_string()),
                ("is_active".to_string(), "on".to_string()),
            ]
        );
    }

    #[test]
    fn focusable_follows_document_order() {
        let doc = sample();
        assert_eq!(
            doc.focusable_descendants("form"),
            vec!["name", "active", "muted", "submit", "link"]
        );
    }

    #[test]
    fn closest_walks_up_parents() {
        let doc = sample();
        assert_eq!(
            doc.closest("submit", |_, el| el.tag() == Tag::Form),
            Some("form".to_string())
        );
        assert!(doc.contains("form", "label"));
        assert!(!doc.contains("wrapper", "name"));
    }

    #[test]
    fn timers_fire_only_when_due() {
        let mut doc = sample();
        doc.focus_after("submit", Duration::from_millis(100));
        doc.advance(Duration::from_millis(99));
        assert_eq!(doc.active_element(), None);
        doc.advance(Duration::from_millis(1));
        assert_eq!(doc.active_element(), Some("submit"));
        assert_eq!(doc.pending_timers(), 0);
    }

    #[test]
    fn remove_children_detaches_subtree() {
        let mut doc = sample();
        doc.focus("submit");
        doc.remove_children("wrapper");
        assert!(doc.children("wrapper").is_empty());
        assert!(!doc.exists("submit"));
        assert_eq!(doc.active_element(), None);
    }
}
