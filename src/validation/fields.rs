//! Per-state field and constraint checks within one definition scope.
//!
//! Everything here is local to a single state: transition-field pairing,
//! type-specific required fields, JSONPath and timestamp formats, and
//! positive-integer bounds. Name resolution lives in
//! [`super::references`].

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::jsonpath::{check_payload_template, is_json_path};
use crate::schema::{
    Catcher, ChoiceRule, ChoiceState, MapState, ParallelState, PassState, Retrier, State,
    StateMachine, SucceedState, TaskState, ValueKind, WaitState,
};
use crate::timestamp::check_timestamp;

use super::{field, Sink};

const MAX_STATE_NAME_LEN: usize = 128;

pub(super) fn validate(
    machine: &StateMachine,
    prefix: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    let states_path = field(prefix, "States");

    if machine.states.is_empty() {
        sink.error(ValidationError::EmptyStates {
            path: states_path.clone(),
        })?;
    }

    if machine.timeout_seconds == Some(0) {
        sink.error(ValidationError::InvalidField {
            path: field(prefix, "TimeoutSeconds"),
            message: "must be a positive integer".to_string(),
        })?;
    }

    for (name, state) in &machine.states {
        if name.is_empty() || name.chars().count() > MAX_STATE_NAME_LEN {
            sink.error(ValidationError::InvalidStateName {
                path: states_path.clone(),
                name: name.clone(),
            })?;
        }
        validate_state(state, &format!("{states_path}.{name}"), sink)?;
    }

    Ok(())
}

fn validate_state(state: &State, path: &str, sink: &mut Sink) -> Result<(), ValidationError> {
    match state {
        State::Pass(s) => validate_pass(s, path, sink),
        State::Task(s) => validate_task(s, path, sink),
        State::Choice(s) => validate_choice(s, path, sink),
        State::Wait(s) => validate_wait(s, path, sink),
        State::Succeed(s) => validate_succeed(s, path, sink),
        State::Fail(_) => Ok(()),
        State::Parallel(s) => validate_parallel(s, path, sink),
        State::Map(s) => validate_map(s, path, sink),
    }
}

fn validate_pass(s: &PassState, path: &str, sink: &mut Sink) -> Result<(), ValidationError> {
    check_transition(&s.next, s.end, path, sink)?;
    check_json_path(&s.input_path, path, "InputPath", sink)?;
    check_json_path(&s.output_path, path, "OutputPath", sink)?;
    check_json_path(&s.result_path, path, "ResultPath", sink)?;
    check_template(&s.parameters, path, "Parameters", sink)?;
    check_template(&s.result, path, "Result", sink)?;
    Ok(())
}

fn validate_task(s: &TaskState, path: &str, sink: &mut Sink) -> Result<(), ValidationError> {
    check_transition(&s.next, s.end, path, sink)?;

    match (s.input_path.is_some(), s.parameters.is_some()) {
        (true, true) => sink.error(ValidationError::ExclusiveFields {
            path: path.to_string(),
            fields: "\"InputPath\", \"Parameters\"".to_string(),
        })?,
        (false, false) => sink.error(ValidationError::RequiredOneOf {
            path: path.to_string(),
            fields: "\"InputPath\", \"Parameters\"".to_string(),
        })?,
        _ => {}
    }

    if s.timeout_seconds.is_some() && s.timeout_seconds_path.is_some() {
        sink.error(ValidationError::ExclusiveFields {
            path: path.to_string(),
            fields: "\"TimeoutSeconds\", \"TimeoutSecondsPath\"".to_string(),
        })?;
    }
    if s.heartbeat_seconds.is_some() && s.heartbeat_seconds_path.is_some() {
        sink.error(ValidationError::ExclusiveFields {
            path: path.to_string(),
            fields: "\"HeartbeatSeconds\", \"HeartbeatSecondsPath\"".to_string(),
        })?;
    }

    check_positive(s.timeout_seconds, path, "TimeoutSeconds", sink)?;
    check_positive(s.heartbeat_seconds, path, "HeartbeatSeconds", sink)?;
    if let (Some(heartbeat), Some(timeout)) = (s.heartbeat_seconds, s.timeout_seconds) {
        if heartbeat > timeout {
            sink.error(ValidationError::HeartbeatExceedsTimeout {
                path: path.to_string(),
                heartbeat,
                timeout,
            })?;
        }
    }

    check_json_path(&s.input_path, path, "InputPath", sink)?;
    check_json_path(&s.output_path, path, "OutputPath", sink)?;
    check_json_path(&s.result_path, path, "ResultPath", sink)?;
    check_json_path(&s.timeout_seconds_path, path, "TimeoutSecondsPath", sink)?;
    check_json_path(&s.heartbeat_seconds_path, path, "HeartbeatSecondsPath", sink)?;
    check_template(&s.parameters, path, "Parameters", sink)?;
    check_template(&s.result_selector, path, "ResultSelector", sink)?;
    check_retriers(&s.retry, path, sink)?;
    check_catchers(&s.catch, path, sink)?;
    Ok(())
}

fn validate_choice(s: &ChoiceState, path: &str, sink: &mut Sink) -> Result<(), ValidationError> {
    if s.choices.is_empty() {
        sink.error(ValidationError::EmptyField {
            path: path.to_string(),
            field: "Choices",
        })?;
    }
    if s.default.is_none() {
        sink.warn(
            "W001",
            path.to_string(),
            "Choice state has no \"Default\"; unmatched input fails at runtime".to_string(),
        );
    }
    check_json_path(&s.input_path, path, "InputPath", sink)?;
    check_json_path(&s.output_path, path, "OutputPath", sink)?;
    for (index, rule) in s.choices.iter().enumerate() {
        validate_choice_rule(rule, &format!("{path}.Choices[{index}]"), true, sink)?;
    }
    Ok(())
}

fn validate_choice_rule(
    rule: &ChoiceRule,
    path: &str,
    top_level: bool,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    if top_level {
        if rule.next.is_none() {
            sink.error(ValidationError::MissingField {
                path: path.to_string(),
                field: "Next",
            })?;
        }
    } else if rule.next.is_some() {
        sink.error(ValidationError::InvalidField {
            path: format!("{path}.Next"),
            message: "\"Next\" is only allowed on top-level choice rules".to_string(),
        })?;
    }

    let set = [
        rule.test.is_some(),
        rule.and.is_some(),
        rule.or.is_some(),
        rule.not.is_some(),
    ]
    .iter()
    .filter(|present| **present)
    .count();
    if set == 0 {
        sink.error(ValidationError::RequiredOneOf {
            path: path.to_string(),
            fields: "a comparison operator, \"And\", \"Or\", \"Not\"".to_string(),
        })?;
    } else if set > 1 {
        sink.error(ValidationError::ExclusiveFields {
            path: path.to_string(),
            fields: "a comparison operator, \"And\", \"Or\", \"Not\"".to_string(),
        })?;
    }

    if rule.test.is_some() && rule.variable.is_none() {
        sink.error(ValidationError::MissingField {
            path: path.to_string(),
            field: "Variable",
        })?;
    }
    if rule.variable.is_some() && rule.test.is_none() {
        sink.error(ValidationError::InvalidField {
            path: format!("{path}.Variable"),
            message: "\"Variable\" requires a comparison operator".to_string(),
        })?;
    }

    if let Some(variable) = &rule.variable {
        if !is_json_path(variable) {
            sink.error(ValidationError::InvalidJsonPath {
                path: format!("{path}.Variable"),
                value: variable.clone(),
            })?;
        }
    }

    if let Some(test) = &rule.test {
        check_operand(test.operator.value_kind(), &test.value, path, test.operator.name(), sink)?;
    }

    for (label, rules) in [("And", &rule.and), ("Or", &rule.or)] {
        if let Some(rules) = rules {
            if rules.is_empty() {
                sink.error(ValidationError::EmptyField {
                    path: path.to_string(),
                    field: if label == "And" { "And" } else { "Or" },
                })?;
            }
            for (index, nested) in rules.iter().enumerate() {
                validate_choice_rule(nested, &format!("{path}.{label}[{index}]"), false, sink)?;
            }
        }
    }
    if let Some(not) = &rule.not {
        validate_choice_rule(not, &format!("{path}.Not"), false, sink)?;
    }

    Ok(())
}

fn check_operand(
    kind: ValueKind,
    value: &Value,
    path: &str,
    operator: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    let operand_path = format!("{path}.{operator}");
    match kind {
        ValueKind::Path => {
            let ok = value.as_str().map(is_json_path).unwrap_or(false);
            if !ok {
                sink.error(ValidationError::InvalidJsonPath {
                    path: operand_path,
                    value: value.to_string(),
                })?;
            }
        }
        ValueKind::String => {
            if !value.is_string() {
                sink.error(ValidationError::InvalidField {
                    path: operand_path,
                    message: format!("{operator} requires a string operand, got {value}"),
                })?;
            }
        }
        ValueKind::Number => {
            if !value.is_number() {
                sink.error(ValidationError::InvalidField {
                    path: operand_path,
                    message: format!("{operator} requires a numeric operand, got {value}"),
                })?;
            }
        }
        ValueKind::Bool => {
            if !value.is_boolean() {
                sink.error(ValidationError::InvalidField {
                    path: operand_path,
                    message: format!("{operator} requires a boolean operand, got {value}"),
                })?;
            }
        }
        ValueKind::Timestamp => match value.as_str() {
            Some(s) => {
                if let Err(message) = check_timestamp(s) {
                    sink.error(ValidationError::InvalidTimestamp {
                        path: operand_path,
                        value: s.to_string(),
                        message,
                    })?;
                }
            }
            None => sink.error(ValidationError::InvalidField {
                path: operand_path,
                message: format!("{operator} requires a timestamp string operand, got {value}"),
            })?,
        },
    }
    Ok(())
}

fn validate_wait(s: &WaitState, path: &str, sink: &mut Sink) -> Result<(), ValidationError> {
    check_transition(&s.next, s.end, path, sink)?;

    let sources = [
        s.seconds.is_some(),
        s.timestamp.is_some(),
        s.seconds_path.is_some(),
        s.timestamp_path.is_some(),
    ]
    .iter()
    .filter(|present| **present)
    .count();
    const WAIT_SOURCES: &str =
        "\"Seconds\", \"Timestamp\", \"SecondsPath\", \"TimestampPath\"";
    if sources == 0 {
        sink.error(ValidationError::RequiredOneOf {
            path: path.to_string(),
            fields: WAIT_SOURCES.to_string(),
        })?;
    } else if sources > 1 {
        sink.error(ValidationError::ExclusiveFields {
            path: path.to_string(),
            fields: WAIT_SOURCES.to_string(),
        })?;
    }

    if let Some(timestamp) = &s.timestamp {
        if let Err(message) = check_timestamp(timestamp) {
            sink.error(ValidationError::InvalidTimestamp {
                path: format!("{path}.Timestamp"),
                value: timestamp.clone(),
                message,
            })?;
        }
    }

    check_json_path(&s.input_path, path, "InputPath", sink)?;
    check_json_path(&s.output_path, path, "OutputPath", sink)?;
    check_json_path(&s.seconds_path, path, "SecondsPath", sink)?;
    check_json_path(&s.timestamp_path, path, "TimestampPath", sink)?;
    Ok(())
}

fn validate_succeed(s: &SucceedState, path: &str, sink: &mut Sink) -> Result<(), ValidationError> {
    check_json_path(&s.input_path, path, "InputPath", sink)?;
    check_json_path(&s.output_path, path, "OutputPath", sink)?;
    Ok(())
}

fn validate_parallel(
    s: &ParallelState,
    path: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    check_transition(&s.next, s.end, path, sink)?;
    if s.branches.is_empty() {
        sink.error(ValidationError::EmptyField {
            path: path.to_string(),
            field: "Branches",
        })?;
    }
    check_json_path(&s.input_path, path, "InputPath", sink)?;
    check_json_path(&s.output_path, path, "OutputPath", sink)?;
    check_json_path(&s.result_path, path, "ResultPath", sink)?;
    check_template(&s.parameters, path, "Parameters", sink)?;
    check_template(&s.result_selector, path, "ResultSelector", sink)?;
    check_retriers(&s.retry, path, sink)?;
    check_catchers(&s.catch, path, sink)?;
    Ok(())
}

fn validate_map(s: &MapState, path: &str, sink: &mut Sink) -> Result<(), ValidationError> {
    check_transition(&s.next, s.end, path, sink)?;
    check_positive(s.max_concurrency, path, "MaxConcurrency", sink)?;
    check_json_path(&s.input_path, path, "InputPath", sink)?;
    check_json_path(&s.output_path, path, "OutputPath", sink)?;
    check_json_path(&s.result_path, path, "ResultPath", sink)?;
    check_json_path(&s.items_path, path, "ItemsPath", sink)?;
    check_template(&s.parameters, path, "Parameters", sink)?;
    check_template(&s.result_selector, path, "ResultSelector", sink)?;
    check_retriers(&s.retry, path, sink)?;
    check_catchers(&s.catch, path, sink)?;
    Ok(())
}

/// `Next` XOR `End: true`. `End: false` counts as unset.
fn check_transition(
    next: &Option<String>,
    end: Option<bool>,
    path: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    let has_end = end == Some(true);
    if next.is_some() && has_end {
        sink.error(ValidationError::ExclusiveFields {
            path: path.to_string(),
            fields: "\"Next\", \"End\"".to_string(),
        })?;
    }
    if next.is_none() && !has_end {
        sink.error(ValidationError::MissingTransition {
            path: path.to_string(),
        })?;
    }
    Ok(())
}

fn check_json_path(
    value: &Option<String>,
    path: &str,
    name: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if !is_json_path(value) {
            sink.error(ValidationError::InvalidJsonPath {
                path: format!("{path}.{name}"),
                value: value.clone(),
            })?;
        }
    }
    Ok(())
}

fn check_template(
    template: &Option<Map<String, Value>>,
    path: &str,
    name: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    if let Some(template) = template {
        if let Err((_, message)) = check_payload_template(template) {
            sink.error(ValidationError::InvalidField {
                path: format!("{path}.{name}"),
                message,
            })?;
        }
    }
    Ok(())
}

fn check_positive(
    value: Option<u64>,
    path: &str,
    name: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    if value == Some(0) {
        sink.error(ValidationError::InvalidField {
            path: format!("{path}.{name}"),
            message: "must be a positive integer".to_string(),
        })?;
    }
    Ok(())
}

fn check_retriers(
    retry: &Option<Vec<Retrier>>,
    path: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    let Some(retriers) = retry else {
        return Ok(());
    };
    if retriers.is_empty() {
        sink.error(ValidationError::EmptyField {
            path: path.to_string(),
            field: "Retry",
        })?;
    }
    for (index, retrier) in retriers.iter().enumerate() {
        let retrier_path = format!("{path}.Retry[{index}]");
        if retrier.error_equals.is_empty() {
            sink.error(ValidationError::EmptyField {
                path: retrier_path.clone(),
                field: "ErrorEquals",
            })?;
        }
        check_positive(retrier.interval_seconds, &retrier_path, "IntervalSeconds", sink)?;
        check_positive(retrier.max_attempts, &retrier_path, "MaxAttempts", sink)?;
        if let Some(rate) = retrier.backoff_rate {
            if rate <= 0.0 {
                sink.error(ValidationError::InvalidField {
                    path: format!("{retrier_path}.BackoffRate"),
                    message: "must be a positive number".to_string(),
                })?;
            }
        }
    }
    Ok(())
}

fn check_catchers(
    catch: &Option<Vec<Catcher>>,
    path: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    let Some(catchers) = catch else {
        return Ok(());
    };
    if catchers.is_empty() {
        sink.error(ValidationError::EmptyField {
            path: path.to_string(),
            field: "Catch",
        })?;
    }
    for (index, catcher) in catchers.iter().enumerate() {
        let catcher_path = format!("{path}.Catch[{index}]");
        if catcher.error_equals.is_empty() {
            sink.error(ValidationError::EmptyField {
                path: catcher_path.clone(),
                field: "ErrorEquals",
            })?;
        }
        check_json_path(&catcher.result_path, &catcher_path, "ResultPath", sink)?;
    }
    Ok(())
}
