//! Integration tests for formwise-validation

use formwise_validation::*;

fn sign_up_engine() -> RuleEngine {
    RuleEngine::new(
        RuleSet::new()
            .add(is_required("#email", Some("Please fill in your email!")))
            .add(is_email("#email", Some("Please enter email in correct format!")))
            .add(is_required("#sign-up-pass", None))
            .add(min_length("#sign-up-pass", 6, None)),
    )
}

#[test]
fn test_required_runs_before_format() {
    let engine = sign_up_engine();

    assert_eq!(
        engine.evaluate("#email", Some("")).as_deref(),
        Some("Please fill in your email!")
    );
    assert_eq!(
        engine.evaluate("#email", Some("nope")).as_deref(),
        Some("Please enter email in correct format!")
    );
    assert_eq!(engine.evaluate("#email", Some("me@site.com")), None);
}

#[test]
fn test_selectors_are_independent() {
    let engine = sign_up_engine();

    assert_eq!(engine.evaluate("#sign-up-pass", Some("abcdef")), None);
    assert!(engine.evaluate("#email", Some("abcdef")).is_some());
}

#[test]
fn test_required_property_over_values() {
    let rule = is_required("#field", Some("needed"));
    for empty in [None, Some("")] {
        assert_eq!(rule.test(empty).as_deref(), Some("needed"));
    }
    for value in ["a", "0", "false", " ", "long value"] {
        assert_eq!(rule.test(Some(value)), None, "{value:?} should pass");
    }
}

#[test]
fn test_collected_errors_report() {
    let engine = sign_up_engine();
    let mut errors = ValidationErrors::default();

    for (selector, value) in [("#email", Some("bad")), ("#sign-up-pass", Some("123"))] {
        if let Err(error) = engine.evaluate_detailed(selector, value) {
            errors.add(error);
        }
    }

    assert_eq!(errors.len(), 2);
    assert_eq!(errors.for_selector("#email")[0].constraint, "isEmail");
    assert_eq!(errors.for_selector("#sign-up-pass")[0].constraint, "minLength");
}

#[test]
fn test_engine_clone_shares_rules() {
    let engine = sign_up_engine();
    let copy = engine.clone();
    assert_eq!(copy.rules().len(), engine.rules().len());
    assert_eq!(copy.rules().selectors().count(), 2);
}
