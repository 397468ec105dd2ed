//! Transition suite: `Next`/`End` pairing and state-name resolution
//! across `StartAt`, `Next`, catchers, choice rules, and nesting.

use serde_json::{json, Value};
use stepfunctions_asl::{definition_from_value, ErrorKind, ValidationError};

fn accepted(definition: Value) {
    let machine = definition_from_value(definition.clone()).unwrap();
    assert_eq!(machine.to_value(), definition);
}

fn rejected(definition: Value) -> ValidationError {
    definition_from_value(definition).unwrap_err()
}

#[test]
fn valid_start_state() {
    accepted(json!({
        "StartAt": "SimplePass",
        "States": {"SimplePass": {"Type": "Pass", "End": true}}
    }));
}

#[test]
fn catch_refers_to_existing_state() {
    accepted(json!({
        "StartAt": "SimpleTask",
        "States": {
            "SimpleTask": {
                "Type": "Task",
                "Resource": "https://example.org/hello_world",
                "Parameters": {},
                "Catch": [{"ErrorEquals": ["SomeError"], "Next": "HandlerState"}],
                "End": true
            },
            "HandlerState": {"Type": "Pass", "End": true}
        }
    }));
}

#[test]
fn choice_targets_refer_to_existing_states() {
    accepted(json!({
        "StartAt": "ChoiceState",
        "States": {
            "ChoiceState": {
                "Type": "Choice",
                "Default": "FinalState",
                "Choices": [{
                    "Variable": "$.some_variable",
                    "BooleanEquals": false,
                    "Next": "FinalState"
                }]
            },
            "FinalState": {"Type": "Pass", "End": true}
        }
    }));
}

#[test]
fn nonexistent_start_state() {
    let err = rejected(json!({
        "StartAt": "DoesNotExistAsAState",
        "States": {"SimplePass": {"Type": "Pass", "End": true}}
    }));
    assert_eq!(err.kind(), ErrorKind::Reference);
    assert_eq!(err.path(), Some("StartAt"));
}

#[test]
fn nonexistent_next_state() {
    let err = rejected(json!({
        "StartAt": "SimplePass",
        "States": {
            "SimplePass": {"Type": "Pass", "Next": "SomeUndefinedState"},
            "SimplePass2": {"Type": "Pass", "End": true}
        }
    }));
    assert!(matches!(err, ValidationError::UnknownState { .. }));
}

#[test]
fn unreachable_state() {
    let err = rejected(json!({
        "StartAt": "SimplePass",
        "States": {
            "SimplePass": {"Type": "Pass", "End": true},
            "UnreachableState": {"Type": "Pass", "End": true}
        }
    }));
    assert!(matches!(err, ValidationError::UnreachableState { .. }));
}

#[test]
fn both_next_and_end_rejected() {
    let err = rejected(json!({
        "StartAt": "SimplePass",
        "States": {"SimplePass": {
            "Type": "Pass",
            "Comment": "both_next_and_end_states_defined",
            "Next": "SimplePass2",
            "End": true
        }}
    }));
    assert!(matches!(err, ValidationError::ExclusiveFields { .. }));
}

#[test]
fn neither_next_nor_end_rejected() {
    let err = rejected(json!({
        "StartAt": "SimplePass",
        "States": {"SimplePass": {"Type": "Pass"}}
    }));
    assert!(matches!(err, ValidationError::MissingTransition { .. }));
}

#[test]
fn end_false_counts_as_unset() {
    let err = rejected(json!({
        "StartAt": "SimplePass",
        "States": {"SimplePass": {"Type": "Pass", "End": false}}
    }));
    assert!(matches!(err, ValidationError::MissingTransition { .. }));
}

#[test]
fn succeed_and_fail_are_inherently_terminal() {
    accepted(json!({
        "StartAt": "A",
        "States": {
            "A": {"Type": "Pass", "Next": "Done"},
            "Done": {"Type": "Succeed"}
        }
    }));
    accepted(json!({
        "StartAt": "A",
        "States": {
            "A": {"Type": "Pass", "Next": "Broken"},
            "Broken": {"Type": "Fail", "Cause": "SomeCause", "Error": "SomeError"}
        }
    }));
}

#[test]
fn fail_state_cannot_transition() {
    // Next is not a Fail-state field at all.
    let err = rejected(json!({
        "StartAt": "F",
        "States": {"F": {"Type": "Fail", "Next": "SomeState"}}
    }));
    assert_eq!(err.kind(), ErrorKind::Shape);
}

#[test]
fn catch_refers_to_nonexistent_state() {
    let err = rejected(json!({
        "StartAt": "SimpleTask",
        "States": {"SimpleTask": {
            "Type": "Task",
            "Resource": "https://example.org/hello_world",
            "Parameters": {},
            "Catch": [{"ErrorEquals": ["SomeError"], "Next": "NotAState"}],
            "End": true
        }}
    }));
    assert!(matches!(err, ValidationError::UnknownState { .. }));
}

#[test]
fn choice_default_refers_to_nonexistent_state() {
    let err = rejected(json!({
        "StartAt": "ChoiceState",
        "States": {
            "ChoiceState": {
                "Type": "Choice",
                "Default": "NotAState",
                "Choices": [{
                    "Variable": "$.some_variable",
                    "BooleanEquals": false,
                    "Next": "FinalState"
                }]
            },
            "FinalState": {"Type": "Pass", "End": true}
        }
    }));
    assert!(matches!(err, ValidationError::UnknownState { .. }));
}

#[test]
fn choice_rule_refers_to_nonexistent_state() {
    let err = rejected(json!({
        "StartAt": "ChoiceState",
        "States": {
            "ChoiceState": {
                "Type": "Choice",
                "Default": "FinalState",
                "Choices": [{
                    "Variable": "$.some_variable",
                    "BooleanEquals": false,
                    "Next": "NotAState"
                }]
            },
            "FinalState": {"Type": "Pass", "End": true}
        }
    }));
    assert!(matches!(err, ValidationError::UnknownState { .. }));
}

#[test]
fn boolean_expression_choice_refers_to_nonexistent_state() {
    let err = rejected(json!({
        "StartAt": "ChoiceState",
        "States": {
            "ChoiceState": {
                "Type": "Choice",
                "Comment": "No info",
                "Default": "FinalState",
                "Choices": [{
                    "Or": [
                        {"Variable": "$.SomePath.status", "StringEquals": "FAILED"},
                        {"Variable": "$.SomePath.status", "StringEquals": "FAILED"}
                    ],
                    "Next": "NonExistantState"
                }]
            },
            "FinalState": {"Type": "Pass", "End": true}
        }
    }));
    assert!(matches!(err, ValidationError::UnknownState { .. }));
}

#[test]
fn nested_branch_failure_surfaces_at_top_level() {
    // Same error kind as a top-level dangling StartAt, path-qualified.
    let err = rejected(json!({
        "StartAt": "P",
        "States": {"P": {
            "Type": "Parallel",
            "End": true,
            "Branches": [
                {"StartAt": "A", "States": {"A": {"Type": "Pass", "End": true}}},
                {"StartAt": "Dangling", "States": {"A": {"Type": "Pass", "End": true}}}
            ]
        }}
    }));
    assert!(matches!(err, ValidationError::UnknownState { .. }));
    assert_eq!(err.kind(), ErrorKind::Reference);
    assert_eq!(err.path(), Some("States.P.Branches[1].StartAt"));
}

#[test]
fn nested_iterator_failure_surfaces_at_top_level() {
    let err = rejected(json!({
        "StartAt": "M",
        "States": {"M": {
            "Type": "Map",
            "ItemsPath": "$.items",
            "End": true,
            "Iterator": {
                "StartAt": "I",
                "States": {
                    "I": {"Type": "Pass", "End": true},
                    "Orphan": {"Type": "Pass", "End": true}
                }
            }
        }}
    }));
    assert!(matches!(err, ValidationError::UnreachableState { .. }));
    assert_eq!(err.path(), Some("States.M.Iterator.States"));
}

#[test]
fn branch_scopes_do_not_leak_names() {
    // A branch cannot reference a state defined in the outer scope.
    let err = rejected(json!({
        "StartAt": "P",
        "States": {
            "P": {
                "Type": "Parallel",
                "Next": "Outer",
                "Branches": [{
                    "StartAt": "A",
                    "States": {"A": {"Type": "Pass", "Next": "Outer"}}
                }]
            },
            "Outer": {"Type": "Succeed"}
        }
    }));
    assert!(matches!(err, ValidationError::UnknownState { .. }));
    assert_eq!(err.path(), Some("States.P.Branches[0].States.A.Next"));
}
