// Form controller: binds rules to fields and reacts to events

use crate::document::parse_selector;
use crate::setup::SubmitHandler;
use crate::{
    ElementId, FieldKind, FormDocument, FormError, FormSetup, Result, Selector, SubmissionRecord,
    aggregate,
};
use formwise_config::FormOptions;
use formwise_log::{debug, info};
use formwise_validation::{RuleEngine, RuleSet, ValidationError, ValidationErrors};
use std::collections::HashMap;
use std::fmt;

const LOG_TARGET: &str = "formwise::form";

/// Field interactions the controller reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    Blur(ElementId),
    Change(ElementId),
    Input(ElementId),
    Click(ElementId),
}

/// What a submission attempt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// At least one field failed; nothing was delivered
    Invalid(ValidationErrors),
    /// The submit handler received this record
    Delivered(SubmissionRecord),
    /// No handler was configured, so the form was submitted natively
    NativeSubmitted,
}

impl SubmitOutcome {
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

/// Result of [`FormController::dispatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// The field was validated; carries the failing message, if any
    Validated(Option<String>),
    /// The field's error display was cleared
    Cleared,
    Submitted(SubmitOutcome),
    /// The event target has nothing to do with this form
    Ignored,
}

#[derive(Debug)]
struct Binding {
    element: ElementId,
    kind: FieldKind,
    // rule selectors matching this element, in registration order
    selectors: Vec<String>,
    group: ElementId,
    slot: ElementId,
}

/// A mounted form.
///
/// Every element inside the form matched by a rule selector is bound at
/// mount time together with its group and message slot. Elements added to
/// the document later are not picked up.
pub struct FormController {
    document: FormDocument,
    options: FormOptions,
    form: ElementId,
    engine: RuleEngine,
    selectors: HashMap<String, Selector>,
    submit: Selector,
    bindings: Vec<Binding>,
    index: HashMap<ElementId, usize>,
    on_submit: Option<SubmitHandler>,
}

impl FormController {
    /// Bind `setup` to the first element of `document` matching its form
    /// selector.
    ///
    /// Fails if the form is missing, a selector does not parse, or a bound
    /// field lacks a group or message slot.
    pub fn mount(document: &FormDocument, setup: FormSetup) -> Result<Self> {
        let (options, rules, on_submit) = setup.into_parts();
        options.validate()?;

        let form_selector = parse_selector(&options.form)?;
        let form = document
            .select(document.root(), &form_selector)
            .ok_or_else(|| FormError::FormNotFound(options.form.clone()))?;
        let group_selector = parse_selector(&options.group_selector)?;
        let slot_selector = parse_selector(&options.error_message_selector)?;
        let submit = parse_selector(&options.submit_selector)?;

        let engine = RuleEngine::new(rules.into_iter().collect::<RuleSet>());
        let mut selectors = HashMap::new();
        let mut bindings: Vec<Binding> = Vec::new();
        let mut index = HashMap::new();

        for selector in engine.rules().selectors() {
            let parsed = parse_selector(selector)?;

            for element in document.select_all(form, &parsed) {
                if let Some(&existing) = index.get(&element) {
                    let binding: &mut Binding = &mut bindings[existing];
                    binding.selectors.push(selector.to_string());
                    continue;
                }

                let group = document
                    .closest_ancestor(element, &group_selector)
                    .ok_or_else(|| FormError::MissingGroup {
                        selector: selector.to_string(),
                        element,
                        group_selector: options.group_selector.clone(),
                    })?;
                let slot = document.select(group, &slot_selector).ok_or_else(|| {
                    FormError::MissingMessageSlot {
                        element,
                        group,
                        message_selector: options.error_message_selector.clone(),
                    }
                })?;

                index.insert(element, bindings.len());
                bindings.push(Binding {
                    element,
                    kind: document.kind(element).unwrap_or(FieldKind::Other),
                    selectors: vec![selector.to_string()],
                    group,
                    slot,
                });
            }

            selectors.insert(selector.to_string(), parsed);
        }

        info!(
            target: LOG_TARGET,
            "mounted {} with {} rules on {} fields",
            options.form,
            engine.rules().len(),
            bindings.len()
        );

        Ok(Self {
            document: document.clone(),
            options,
            form,
            engine,
            selectors,
            submit,
            bindings,
            index,
            on_submit,
        })
    }

    pub fn document(&self) -> &FormDocument {
        &self.document
    }

    pub fn form(&self) -> ElementId {
        self.form
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Bound fields in binding order
    pub fn bound_elements(&self) -> Vec<ElementId> {
        self.bindings.iter().map(|b| b.element).collect()
    }

    pub fn is_bound(&self, element: ElementId) -> bool {
        self.index.contains_key(&element)
    }

    pub fn group_of(&self, element: ElementId) -> Option<ElementId> {
        self.binding(element).ok().map(|b| b.group)
    }

    pub fn message_slot_of(&self, element: ElementId) -> Option<ElementId> {
        self.binding(element).ok().map(|b| b.slot)
    }

    /// Whether the field's group currently carries the invalid class
    pub fn is_marked_invalid(&self, element: ElementId) -> bool {
        self.group_of(element)
            .is_some_and(|group| self.document.has_class(group, &self.options.invalid_class))
    }

    /// Validate a field that lost focus; returns the message shown, if any
    pub fn blur(&self, element: ElementId) -> Result<Option<String>> {
        let binding = self.binding(element)?;
        debug!(target: LOG_TARGET, "blur on {}", element);
        Ok(self.validate_binding(binding)?.map(|e| e.message))
    }

    /// Same as [`blur`](Self::blur); checkboxes, radios, selects and file
    /// inputs report through change
    pub fn change(&self, element: ElementId) -> Result<Option<String>> {
        let binding = self.binding(element)?;
        debug!(target: LOG_TARGET, "change on {}", element);
        Ok(self.validate_binding(binding)?.map(|e| e.message))
    }

    /// Clear the field's error while the user is typing; nothing is
    /// re-validated
    pub fn input(&self, element: ElementId) -> Result<()> {
        let binding = self.binding(element)?;
        self.clear(binding)
    }

    /// Submit if `element` is one of this form's submit controls
    pub fn click(&mut self, element: ElementId) -> Result<Option<SubmitOutcome>> {
        if !self.is_submit_control(element) {
            return Ok(None);
        }
        self.submit().map(Some)
    }

    /// Validate every bound field, then deliver or fall back to native
    /// submission.
    ///
    /// All fields are validated even after the first failure so each group
    /// shows its own state.
    pub fn submit(&mut self) -> Result<SubmitOutcome> {
        let mut errors = ValidationErrors::default();
        for binding in &self.bindings {
            if let Some(error) = self.validate_binding(binding)? {
                errors.add(error);
            }
        }

        if !errors.is_empty() {
            info!(
                target: LOG_TARGET,
                "submit of {} blocked, {} invalid fields",
                self.options.form,
                errors.len()
            );
            return Ok(SubmitOutcome::Invalid(errors));
        }

        match self.on_submit.as_mut() {
            Some(handler) => {
                let record = aggregate(&self.document, self.form, self.options.radio_policy);
                info!(
                    target: LOG_TARGET,
                    "submit of {} delivered {} values",
                    self.options.form,
                    record.len()
                );
                handler(&record);
                Ok(SubmitOutcome::Delivered(record))
            }
            None => {
                debug!(
                    target: LOG_TARGET,
                    "no submit handler for {}, submitting natively", self.options.form
                );
                self.document.submit_native(self.form)?;
                Ok(SubmitOutcome::NativeSubmitted)
            }
        }
    }

    /// Route an event to the matching handler. Events on unbound fields
    /// are ignored.
    pub fn dispatch(&mut self, event: FormEvent) -> Result<EventOutcome> {
        let outcome = match event {
            FormEvent::Blur(element) => self.blur(element).map(EventOutcome::Validated),
            FormEvent::Change(element) => self.change(element).map(EventOutcome::Validated),
            FormEvent::Input(element) => self.input(element).map(|()| EventOutcome::Cleared),
            FormEvent::Click(element) => {
                return Ok(self
                    .click(element)?
                    .map_or(EventOutcome::Ignored, EventOutcome::Submitted));
            }
        };

        match outcome {
            Err(FormError::NotBound(_)) => Ok(EventOutcome::Ignored),
            other => other,
        }
    }

    fn binding(&self, element: ElementId) -> Result<&Binding> {
        self.index
            .get(&element)
            .map(|&i| &self.bindings[i])
            .ok_or(FormError::NotBound(element))
    }

    fn is_submit_control(&self, element: ElementId) -> bool {
        self.document.is_ancestor(self.form, element) && self.document.matches(element, &self.submit)
    }

    /// Current value of a field as seen through `selector`.
    ///
    /// Checkboxes and radios report the value of the first checked element
    /// in the form matching the selector, or `None` if none is checked.
    fn resolve_value(&self, binding: &Binding, selector: &str) -> Option<String> {
        if !binding.kind.is_choice() {
            return self.document.value(binding.element);
        }

        let parsed = self.selectors.get(selector)?;
        self.document
            .select_all(self.form, parsed)
            .into_iter()
            .find(|&id| self.document.is_checked(id))
            .and_then(|id| self.document.value(id))
    }

    fn validate_binding(&self, binding: &Binding) -> Result<Option<ValidationError>> {
        let mut failure = None;
        for selector in &binding.selectors {
            let value = self.resolve_value(binding, selector);
            if let Err(error) = self.engine.evaluate_detailed(selector, value.as_deref()) {
                failure = Some(error);
                break;
            }
        }

        match &failure {
            Some(error) => {
                debug!(
                    target: LOG_TARGET,
                    "{} failed {}: {}", error.selector, error.constraint, error.message
                );
                self.document.set_text(binding.slot, error.message.as_str())?;
                self.document.add_class(binding.group, &self.options.invalid_class)?;
            }
            None => {
                debug!(target: LOG_TARGET, "{} passed", binding.element);
                self.clear(binding)?;
            }
        }
        Ok(failure)
    }

    fn clear(&self, binding: &Binding) -> Result<()> {
        self.document.set_text(binding.slot, "")?;
        self.document
            .remove_class(binding.group, &self.options.invalid_class)
    }
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("form", &self.form)
            .field("options", &self.options)
            .field("bindings", &self.bindings)
            .field("on_submit", &self.on_submit.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Element;
    use formwise_validation::{is_email, is_required, min_length};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct SignIn {
        doc: FormDocument,
        form: ElementId,
        user: ElementId,
        user_group: ElementId,
        user_message: ElementId,
        email: ElementId,
        button: ElementId,
    }

    fn sign_in() -> SignIn {
        let doc = FormDocument::new();
        let form = doc
            .append(doc.root(), Element::new("form").class("sign-in-htm"))
            .unwrap();

        let user_group = doc.append(form, Element::new("div").class("group")).unwrap();
        let user = doc
            .append(user_group, Element::input("text").id("sign-in-user").name("user"))
            .unwrap();
        let user_message = doc
            .append(user_group, Element::new("span").class("message"))
            .unwrap();

        let email_group = doc.append(form, Element::new("div").class("group")).unwrap();
        let email = doc
            .append(email_group, Element::input("email").id("sign-in-email").name("email"))
            .unwrap();
        doc.append(email_group, Element::new("span").class("message"))
            .unwrap();

        let button = doc
            .append(form, Element::input("submit").class("button").value("Sign In"))
            .unwrap();

        SignIn {
            doc,
            form,
            user,
            user_group,
            user_message,
            email,
            button,
        }
    }

    fn options() -> FormOptions {
        FormOptions::new(".sign-in-htm")
            .group_selector(".group")
            .error_message_selector(".message")
    }

    fn setup() -> FormSetup {
        FormSetup::new(options())
            .rule(is_required("#sign-in-user", None))
            .rule(is_required("#sign-in-email", None))
            .rule(is_email("#sign-in-email", None))
    }

    #[test]
    fn test_mount_binds_fields() {
        let s = sign_in();
        let controller = FormController::mount(&s.doc, setup()).unwrap();

        assert_eq!(controller.form(), s.form);
        assert_eq!(controller.bound_elements(), vec![s.user, s.email]);
        assert_eq!(controller.group_of(s.user), Some(s.user_group));
        assert_eq!(controller.message_slot_of(s.user), Some(s.user_message));
        assert!(!controller.is_bound(s.button));
    }

    #[test]
    fn test_mount_missing_form() {
        let doc = FormDocument::new();
        let err = FormController::mount(&doc, setup()).unwrap_err();
        assert!(matches!(err, FormError::FormNotFound(ref sel) if sel == ".sign-in-htm"));
    }

    #[test]
    fn test_mount_missing_group() {
        let s = sign_in();
        s.doc
            .append(s.form, Element::input("text").id("orphan"))
            .unwrap();
        let err = FormController::mount(&s.doc, setup().rule(is_required("#orphan", None)))
            .unwrap_err();
        assert!(matches!(err, FormError::MissingGroup { ref selector, .. } if selector == "#orphan"));
    }

    #[test]
    fn test_mount_missing_slot() {
        let s = sign_in();
        let group = s.doc.append(s.form, Element::new("div").class("group")).unwrap();
        s.doc.append(group, Element::input("text").id("lonely")).unwrap();
        let err = FormController::mount(&s.doc, setup().rule(is_required("#lonely", None)))
            .unwrap_err();
        assert!(matches!(err, FormError::MissingMessageSlot { group: g, .. } if g == group));
    }

    #[test]
    fn test_mount_rejects_bad_selector() {
        let s = sign_in();
        let err = FormController::mount(&s.doc, setup().rule(is_required("input:hover", None)))
            .unwrap_err();
        assert!(matches!(err, FormError::InvalidSelector { .. }));
    }

    #[test]
    fn test_selector_matching_nothing_is_allowed() {
        let s = sign_in();
        let controller =
            FormController::mount(&s.doc, setup().rule(is_required("#nowhere", None))).unwrap();
        assert_eq!(controller.bound_elements().len(), 2);
    }

    #[test]
    fn test_blur_presents_and_clears() {
        let s = sign_in();
        let controller = FormController::mount(&s.doc, setup()).unwrap();

        assert_eq!(
            controller.blur(s.user).unwrap().as_deref(),
            Some("Please fill in this field!")
        );
        assert_eq!(
            s.doc.text(s.user_message).as_deref(),
            Some("Please fill in this field!")
        );
        assert!(controller.is_marked_invalid(s.user));

        s.doc.set_value(s.user, "ada").unwrap();
        assert_eq!(controller.blur(s.user).unwrap(), None);
        assert_eq!(s.doc.text(s.user_message).as_deref(), Some(""));
        assert!(!controller.is_marked_invalid(s.user));
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let s = sign_in();
        let controller = FormController::mount(&s.doc, setup()).unwrap();

        assert_eq!(
            controller.blur(s.email).unwrap().as_deref(),
            Some("Please fill in this field!")
        );
        s.doc.set_value(s.email, "not-an-email").unwrap();
        assert_eq!(
            controller.blur(s.email).unwrap().as_deref(),
            Some("Please enter this field in correct format!")
        );
    }

    #[test]
    fn test_input_clears_without_validating() {
        let s = sign_in();
        let controller = FormController::mount(&s.doc, setup()).unwrap();
        controller.blur(s.user).unwrap();

        controller.input(s.user).unwrap();
        assert_eq!(s.doc.text(s.user_message).as_deref(), Some(""));
        assert!(!controller.is_marked_invalid(s.user));
    }

    #[test]
    fn test_element_under_two_selectors_runs_both() {
        let s = sign_in();
        let setup = setup().rule(min_length(".group input", 5, None));
        let controller = FormController::mount(&s.doc, setup).unwrap();

        s.doc.set_value(s.user, "ada").unwrap();
        assert_eq!(
            controller.blur(s.user).unwrap().as_deref(),
            Some("This field must be at least 5 characters!")
        );
        s.doc.set_value(s.user, "lovelace").unwrap();
        assert_eq!(controller.blur(s.user).unwrap(), None);
    }

    #[test]
    fn test_unbound_events_are_ignored() {
        let s = sign_in();
        let mut controller = FormController::mount(&s.doc, setup()).unwrap();

        assert!(matches!(controller.blur(s.button), Err(FormError::NotBound(_))));
        assert_eq!(
            controller.dispatch(FormEvent::Blur(s.button)).unwrap(),
            EventOutcome::Ignored
        );
        assert_eq!(
            controller.dispatch(FormEvent::Click(s.user)).unwrap(),
            EventOutcome::Ignored
        );
    }

    #[test]
    fn test_invalid_submit_marks_every_group() {
        let s = sign_in();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let mut controller = FormController::mount(
            &s.doc,
            setup().on_submit(move |_| *counter.borrow_mut() += 1),
        )
        .unwrap();

        let outcome = controller.submit().unwrap();
        let SubmitOutcome::Invalid(errors) = outcome else {
            panic!("expected invalid submit");
        };
        assert_eq!(errors.len(), 2);
        assert!(controller.is_marked_invalid(s.user));
        assert!(controller.is_marked_invalid(s.email));
        assert_eq!(*calls.borrow(), 0);
        assert_eq!(s.doc.native_submissions(s.form), 0);
    }

    #[test]
    fn test_valid_click_delivers_once() {
        let s = sign_in();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut controller = FormController::mount(
            &s.doc,
            setup().on_submit(move |record| sink.borrow_mut().push(record.clone())),
        )
        .unwrap();

        s.doc.set_value(s.user, "ada").unwrap();
        s.doc.set_value(s.email, "ada@example.com").unwrap();

        let outcome = controller.dispatch(FormEvent::Click(s.button)).unwrap();
        assert!(matches!(outcome, EventOutcome::Submitted(SubmitOutcome::Delivered(_))));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].get("email").and_then(|v| v.as_text()),
            Some("ada@example.com")
        );
        assert_eq!(s.doc.native_submissions(s.form), 0);
    }

    #[test]
    fn test_native_fallback_without_handler() {
        let s = sign_in();
        let mut controller = FormController::mount(&s.doc, setup()).unwrap();
        s.doc.set_value(s.user, "ada").unwrap();
        s.doc.set_value(s.email, "ada@example.com").unwrap();

        assert_eq!(
            controller.click(s.button).unwrap(),
            Some(SubmitOutcome::NativeSubmitted)
        );
        assert_eq!(s.doc.native_submissions(s.form), 1);
    }

    #[test]
    fn test_radio_value_is_first_checked() {
        let doc = FormDocument::new();
        let form = doc.append(doc.root(), Element::new("form").id("survey")).unwrap();
        let group = doc.append(form, Element::new("div").class("group")).unwrap();
        let male = doc
            .append(group, Element::input("radio").name("gender").value("male"))
            .unwrap();
        let female = doc
            .append(group, Element::input("radio").name("gender").value("female"))
            .unwrap();
        doc.append(group, Element::new("span").class("message")).unwrap();

        let setup = FormSetup::new(
            FormOptions::new("#survey")
                .group_selector(".group")
                .error_message_selector(".message"),
        )
        .rule(is_required("input[name=gender]", Some("Pick one")));
        let controller = FormController::mount(&doc, setup).unwrap();

        assert_eq!(controller.change(male).unwrap().as_deref(), Some("Pick one"));
        doc.set_checked(female, true).unwrap();
        assert_eq!(controller.change(male).unwrap(), None);
    }

    #[test]
    fn test_checked_checkbox_without_value_is_required_ok() {
        let doc = FormDocument::new();
        let form = doc.append(doc.root(), Element::new("form").id("terms-form")).unwrap();
        let group = doc.append(form, Element::new("div").class("group")).unwrap();
        let terms = doc
            .append(group, Element::input("checkbox").id("terms").name("terms"))
            .unwrap();
        doc.append(group, Element::new("span").class("message")).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let setup = FormSetup::new(
            FormOptions::new("#terms-form")
                .group_selector(".group")
                .error_message_selector(".message"),
        )
        .rule(is_required("#terms", None))
        .on_submit(move |record| sink.borrow_mut().push(record.clone()));
        let mut controller = FormController::mount(&doc, setup).unwrap();

        assert_eq!(
            controller.change(terms).unwrap().as_deref(),
            Some("Please fill in this field!")
        );

        doc.set_checked(terms, true).unwrap();
        assert_eq!(controller.change(terms).unwrap(), None);
        assert!(matches!(controller.submit().unwrap(), SubmitOutcome::Delivered(_)));
        assert_eq!(
            seen.borrow()[0].get("terms"),
            Some(&crate::FieldValue::List(vec!["on".into()]))
        );
    }
}
