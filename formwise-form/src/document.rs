// In-memory form document
//
// Elements live in an arena; ids are indices and stay valid for the life of
// the document. `FormDocument` is a shared handle, so clones observe each
// other's changes.

use crate::{FieldKind, FileHandle, FormError, Result, Selector};
use parking_lot::RwLock;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Handle to one element of a [`FormDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An element's markup and live state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// Attributes other than `id` and `class`
    pub attrs: BTreeMap<String, String>,
    /// Current value, separate from any `value` attribute
    pub value: String,
    pub checked: bool,
    pub files: Vec<FileHandle>,
    pub text: String,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// `<input type="...">`; checkboxes and radios start with the value `on`
    pub fn input(input_type: &str) -> Self {
        let element = Self::new("input").attr("type", input_type);
        if FieldKind::from_input_type(input_type).is_choice() {
            element.value("on")
        } else {
            element
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.has_class(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.attr("name", name)
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn disabled(self) -> Self {
        self.attr("disabled", "")
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn files(mut self, files: Vec<FileHandle>) -> Self {
        self.files = files;
        self
    }

    pub fn kind(&self) -> FieldKind {
        FieldKind::of(self)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr_value(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => self.id.as_deref().map(Cow::Borrowed),
            "class" if self.classes.is_empty() => None,
            "class" => Some(Cow::Owned(self.classes.join(" "))),
            name => self.attrs.get(name).map(|v| Cow::Borrowed(v.as_str())),
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn field_name(&self) -> Option<&str> {
        self.get_attr("name")
    }

    pub fn is_disabled(&self) -> bool {
        self.attrs.contains_key("disabled")
    }

    /// Only checkboxes and radios can be checked
    pub fn is_checked(&self) -> bool {
        self.checked && self.kind().is_choice()
    }
}

#[derive(Debug)]
struct Node {
    element: Element,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

#[derive(Debug)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
    native_submissions: HashMap<ElementId, usize>,
}

impl Default for Tree {
    fn default() -> Self {
        Self {
            nodes: vec![Node {
                element: Element::new("#document"),
                parent: None,
                children: Vec::new(),
            }],
            native_submissions: HashMap::new(),
        }
    }
}

impl Tree {
    pub(crate) fn element(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id.0).map(|node| &node.element)
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.nodes
            .get_mut(id.0)
            .map(|node| &mut node.element)
            .ok_or(FormError::UnknownElement(id))
    }

    pub(crate) fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    pub(crate) fn is_root(&self, id: ElementId) -> bool {
        id.0 == 0
    }

    fn contains(&self, id: ElementId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Descendants of `scope` in document order, excluding `scope`
    fn descendants(&self, scope: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = match self.nodes.get(scope.0) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    fn is_ancestor(&self, ancestor: ElementId, mut id: ElementId) -> bool {
        while let Some(parent) = self.parent(id) {
            if parent == ancestor {
                return true;
            }
            id = parent;
        }
        false
    }

    /// Closest strict ancestor that is a `<form>`, else the document root
    fn form_owner(&self, id: ElementId) -> ElementId {
        let mut current = self.parent(id);
        while let Some(candidate) = current {
            if self.nodes[candidate.0].element.tag == "form" {
                return candidate;
            }
            current = self.parent(candidate);
        }
        ElementId(0)
    }
}

/// Shared handle to an element tree
#[derive(Clone, Default)]
pub struct FormDocument {
    tree: Arc<RwLock<Tree>>,
}

impl fmt::Debug for FormDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormDocument")
            .field("elements", &(self.tree.read().nodes.len() - 1))
            .finish()
    }
}

impl FormDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// The document node; it is never matched by a selector
    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    /// Append `element` as the last child of `parent`
    pub fn append(&self, parent: ElementId, element: Element) -> Result<ElementId> {
        let mut tree = self.tree.write();
        if !tree.contains(parent) {
            return Err(FormError::UnknownElement(parent));
        }

        let id = ElementId(tree.nodes.len());
        tree.nodes.push(Node {
            element,
            parent: Some(parent),
            children: Vec::new(),
        });
        tree.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Snapshot of an element
    pub fn element(&self, id: ElementId) -> Option<Element> {
        self.tree.read().element(id).cloned()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.tree.read().contains(id)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.tree.read().parent(id)
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.tree
            .read()
            .nodes
            .get(id.0)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    pub fn kind(&self, id: ElementId) -> Option<FieldKind> {
        self.tree.read().element(id).map(Element::kind)
    }

    pub fn value(&self, id: ElementId) -> Option<String> {
        self.tree.read().element(id).map(|e| e.value.clone())
    }

    pub fn set_value(&self, id: ElementId, value: impl Into<String>) -> Result<()> {
        self.tree.write().element_mut(id)?.value = value.into();
        Ok(())
    }

    pub fn is_checked(&self, id: ElementId) -> bool {
        self.tree.read().element(id).is_some_and(Element::is_checked)
    }

    /// Set checkedness; checking a named radio unchecks the rest of its
    /// group within the same form
    pub fn set_checked(&self, id: ElementId, checked: bool) -> Result<()> {
        let mut tree = self.tree.write();
        let element = tree.element_mut(id)?;
        element.checked = checked;

        if !checked || element.kind() != FieldKind::Radio {
            return Ok(());
        }
        let Some(name) = element.field_name().map(str::to_string) else {
            return Ok(());
        };

        let owner = tree.form_owner(id);
        let siblings: Vec<ElementId> = tree
            .descendants(owner)
            .into_iter()
            .filter(|&other| other != id && tree.form_owner(other) == owner)
            .filter(|&other| {
                tree.element(other).is_some_and(|e| {
                    e.kind() == FieldKind::Radio && e.field_name() == Some(name.as_str())
                })
            })
            .collect();

        for other in siblings {
            tree.element_mut(other)?.checked = false;
        }
        Ok(())
    }

    pub fn is_disabled(&self, id: ElementId) -> bool {
        self.tree.read().element(id).is_some_and(Element::is_disabled)
    }

    pub fn set_disabled(&self, id: ElementId, disabled: bool) -> Result<()> {
        let mut tree = self.tree.write();
        let attrs = &mut tree.element_mut(id)?.attrs;
        if disabled {
            attrs.insert("disabled".to_string(), String::new());
        } else {
            attrs.remove("disabled");
        }
        Ok(())
    }

    pub fn files(&self, id: ElementId) -> Vec<FileHandle> {
        self.tree
            .read()
            .element(id)
            .map(|e| e.files.clone())
            .unwrap_or_default()
    }

    pub fn set_files(&self, id: ElementId, files: Vec<FileHandle>) -> Result<()> {
        self.tree.write().element_mut(id)?.files = files;
        Ok(())
    }

    pub fn text(&self, id: ElementId) -> Option<String> {
        self.tree.read().element(id).map(|e| e.text.clone())
    }

    pub fn set_text(&self, id: ElementId, text: impl Into<String>) -> Result<()> {
        self.tree.write().element_mut(id)?.text = text.into();
        Ok(())
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.tree.read().element(id).is_some_and(|e| e.has_class(class))
    }

    pub fn add_class(&self, id: ElementId, class: &str) -> Result<()> {
        let mut tree = self.tree.write();
        let element = tree.element_mut(id)?;
        if !element.has_class(class) {
            element.classes.push(class.to_string());
        }
        Ok(())
    }

    pub fn remove_class(&self, id: ElementId, class: &str) -> Result<()> {
        self.tree.write().element_mut(id)?.classes.retain(|c| c != class);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whether `id` matches `selector`
    pub fn matches(&self, id: ElementId, selector: &Selector) -> bool {
        selector.matches(&self.tree.read(), id)
    }

    /// Descendants of `scope` matching `selector`, in document order.
    ///
    /// Like the DOM, ancestors named in the selector may lie outside `scope`.
    pub fn select_all(&self, scope: ElementId, selector: &Selector) -> Vec<ElementId> {
        let tree = self.tree.read();
        tree.descendants(scope)
            .into_iter()
            .filter(|&id| selector.matches(&tree, id))
            .collect()
    }

    /// First descendant of `scope` matching `selector`
    pub fn select(&self, scope: ElementId, selector: &Selector) -> Option<ElementId> {
        let tree = self.tree.read();
        tree.descendants(scope)
            .into_iter()
            .find(|&id| selector.matches(&tree, id))
    }

    pub fn query_selector_all(&self, scope: ElementId, selector: &str) -> Result<Vec<ElementId>> {
        Ok(self.select_all(scope, &parse_selector(selector)?))
    }

    pub fn query_selector(&self, scope: ElementId, selector: &str) -> Result<Option<ElementId>> {
        Ok(self.select(scope, &parse_selector(selector)?))
    }

    /// Nearest strict ancestor of `id` matching `selector`
    pub fn closest_ancestor(&self, id: ElementId, selector: &Selector) -> Option<ElementId> {
        let tree = self.tree.read();
        let mut current = tree.parent(id);
        while let Some(candidate) = current {
            if selector.matches(&tree, candidate) {
                return Some(candidate);
            }
            current = tree.parent(candidate);
        }
        None
    }

    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        self.tree.read().is_ancestor(ancestor, id)
    }

    /// A zero-argument accessor returning the current value of the first
    /// element under `scope` matching `selector`, looked up on every call
    pub fn value_accessor(
        &self,
        scope: ElementId,
        selector: &str,
    ) -> Result<impl Fn() -> Option<String> + Send + Sync + 'static> {
        let selector = parse_selector(selector)?;
        let document = self.clone();
        Ok(move || {
            document
                .select(scope, &selector)
                .and_then(|id| document.value(id))
        })
    }

    // ------------------------------------------------------------------
    // Native submission
    // ------------------------------------------------------------------

    /// Submit `form` the way the browser would without a handler
    pub fn submit_native(&self, form: ElementId) -> Result<()> {
        let mut tree = self.tree.write();
        if !tree.contains(form) {
            return Err(FormError::UnknownElement(form));
        }
        *tree.native_submissions.entry(form).or_insert(0) += 1;
        Ok(())
    }

    /// How many native submissions `form` has seen
    pub fn native_submissions(&self, form: ElementId) -> usize {
        self.tree
            .read()
            .native_submissions
            .get(&form)
            .copied()
            .unwrap_or(0)
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|source| FormError::InvalidSelector {
        selector: selector.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        doc: FormDocument,
        form: ElementId,
        group: ElementId,
        user: ElementId,
        message: ElementId,
    }

    fn fixture() -> Fixture {
        let doc = FormDocument::new();
        let form = doc
            .append(doc.root(), Element::new("form").class("sign-in-htm"))
            .unwrap();
        let group = doc.append(form, Element::new("div").class("group")).unwrap();
        let user = doc
            .append(group, Element::input("text").id("user").name("user"))
            .unwrap();
        let message = doc
            .append(group, Element::new("span").class("message"))
            .unwrap();
        Fixture {
            doc,
            form,
            group,
            user,
            message,
        }
    }

    #[test]
    fn test_query_within_scope() {
        let f = fixture();
        assert_eq!(f.doc.query_selector(f.form, "#user").unwrap(), Some(f.user));
        assert_eq!(f.doc.query_selector(f.user, "#user").unwrap(), None);
        assert_eq!(
            f.doc.query_selector_all(f.form, ".group, .message").unwrap(),
            vec![f.group, f.message]
        );
    }

    #[test]
    fn test_descendant_selector_may_reach_outside_scope() {
        let f = fixture();
        let found = f
            .doc
            .query_selector(f.group, ".sign-in-htm .message")
            .unwrap();
        assert_eq!(found, Some(f.message));
    }

    #[test]
    fn test_child_combinator() {
        let f = fixture();
        assert_eq!(f.doc.query_selector(f.doc.root(), "form > #user").unwrap(), None);
        assert_eq!(
            f.doc.query_selector(f.doc.root(), "form > .group > #user").unwrap(),
            Some(f.user)
        );
    }

    #[test]
    fn test_closest_ancestor_skips_self() {
        let f = fixture();
        let group = parse_selector(".group").unwrap();
        assert_eq!(f.doc.closest_ancestor(f.user, &group), Some(f.group));
        assert_eq!(f.doc.closest_ancestor(f.group, &group), None);
    }

    #[test]
    fn test_root_never_matches() {
        let f = fixture();
        let all = parse_selector("*").unwrap();
        assert!(!f.doc.matches(f.doc.root(), &all));
        assert!(f.doc.matches(f.form, &all));
    }

    #[test]
    fn test_attribute_and_pseudo_matching() {
        let f = fixture();
        let named_enabled = parse_selector("[name]:not([disabled])").unwrap();
        assert!(f.doc.matches(f.user, &named_enabled));

        f.doc.set_disabled(f.user, true).unwrap();
        assert!(!f.doc.matches(f.user, &named_enabled));
        assert!(f.doc.matches(f.user, &parse_selector("input:disabled").unwrap()));
        assert!(f.doc.matches(f.user, &parse_selector("[name=user]").unwrap()));
        assert!(f.doc.matches(f.user, &parse_selector("[id='user']").unwrap()));
    }

    #[test]
    fn test_checking_radio_unchecks_group() {
        let doc = FormDocument::new();
        let form = doc.append(doc.root(), Element::new("form")).unwrap();
        let other_form = doc.append(doc.root(), Element::new("form")).unwrap();
        let male = doc
            .append(form, Element::input("radio").name("gender").value("male"))
            .unwrap();
        let female = doc
            .append(form, Element::input("radio").name("gender").value("female"))
            .unwrap();
        let elsewhere = doc
            .append(other_form, Element::input("radio").name("gender").checked(true))
            .unwrap();

        doc.set_checked(male, true).unwrap();
        doc.set_checked(female, true).unwrap();

        assert!(!doc.is_checked(male));
        assert!(doc.is_checked(female));
        assert!(doc.is_checked(elsewhere));
    }

    #[test]
    fn test_choice_inputs_default_to_on() {
        assert_eq!(Element::input("checkbox").value, "on");
        assert_eq!(Element::input("Radio").value, "on");
        assert_eq!(Element::input("checkbox").value("yes").value, "yes");
        assert_eq!(Element::input("text").value, "");
    }

    #[test]
    fn test_checked_only_applies_to_choices() {
        let f = fixture();
        f.doc.set_checked(f.user, true).unwrap();
        assert!(!f.doc.is_checked(f.user));
        assert!(f.doc.query_selector(f.form, ":checked").unwrap().is_none());
    }

    #[test]
    fn test_class_and_text_mutation() {
        let f = fixture();
        f.doc.add_class(f.group, "invalid").unwrap();
        f.doc.add_class(f.group, "invalid").unwrap();
        assert_eq!(f.doc.element(f.group).unwrap().classes, vec!["group", "invalid"]);

        f.doc.remove_class(f.group, "invalid").unwrap();
        assert!(!f.doc.has_class(f.group, "invalid"));

        f.doc.set_text(f.message, "oops").unwrap();
        assert_eq!(f.doc.text(f.message).as_deref(), Some("oops"));
    }

    #[test]
    fn test_value_accessor_is_live() {
        let f = fixture();
        let read = f.doc.value_accessor(f.doc.root(), ".sign-in-htm #user").unwrap();

        assert_eq!(read().as_deref(), Some(""));
        f.doc.set_value(f.user, "alice").unwrap();
        assert_eq!(read().as_deref(), Some("alice"));
    }

    #[test]
    fn test_invalid_selector_error() {
        let f = fixture();
        let err = f.doc.query_selector(f.form, "input:hover").unwrap_err();
        assert!(matches!(err, FormError::InvalidSelector { .. }));
    }

    #[test]
    fn test_unknown_element() {
        let doc = FormDocument::new();
        let other = FormDocument::new();
        let form = other.append(other.root(), Element::new("form")).unwrap();
        assert!(matches!(
            doc.set_value(form, "x"),
            Err(FormError::UnknownElement(_))
        ));
        assert!(doc.append(form, Element::new("div")).is_err());
    }

    #[test]
    fn test_native_submission_counter() {
        let f = fixture();
        assert_eq!(f.doc.native_submissions(f.form), 0);
        f.doc.submit_native(f.form).unwrap();
        f.doc.submit_native(f.form).unwrap();
        assert_eq!(f.doc.native_submissions(f.form), 2);
    }
}
