//! Data model for Amazon States Language (ASL) state-machine definitions.
//!
//! Every type maps one-to-one onto the JSON grammar: wire names keep the
//! exact PascalCase spelling of the ASL specification, and unknown fields
//! are rejected everywhere. Deserializing only checks document shape;
//! cross-field and cross-state rules live in [`crate::validation`].

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ValidationError;

// ================================
// State machine definition
// ================================

/// A state-machine definition: the top-level ASL document.
///
/// Owns its `States` mapping and, transitively, every nested definition
/// inside Parallel branches and Map iterators. `StartAt` and the various
/// `Next` fields are stored as names and resolved during validation, never
/// as object references.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct StateMachine {
    pub start_at: String,
    pub states: BTreeMap<String, State>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl StateMachine {
    /// Canonical JSON value of this definition, with unset optional
    /// fields omitted.
    pub fn to_value(&self) -> Value {
        // Serialization of an in-memory definition cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Canonical JSON text of this definition.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

// ================================
// States
// ================================

/// Names of the eight ASL state types, in discriminator spelling.
pub const STATE_TYPES: &[&str] = &[
    "Pass", "Task", "Choice", "Wait", "Succeed", "Fail", "Parallel", "Map",
];

/// One state of a state machine, discriminated by the `Type` field.
///
/// Serialization is internally tagged. Deserialization is hand-written:
/// serde's internally tagged enums cannot be combined with
/// `deny_unknown_fields`, so the `Type` tag is popped from the object and
/// the remainder dispatched to the matching variant struct.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "Type")]
pub enum State {
    Pass(PassState),
    Task(TaskState),
    Choice(ChoiceState),
    Wait(WaitState),
    Succeed(SucceedState),
    Fail(FailState),
    Parallel(ParallelState),
    Map(MapState),
}

impl State {
    /// Discriminator spelling of this state's type.
    pub fn state_type(&self) -> &'static str {
        match self {
            State::Pass(_) => "Pass",
            State::Task(_) => "Task",
            State::Choice(_) => "Choice",
            State::Wait(_) => "Wait",
            State::Succeed(_) => "Succeed",
            State::Fail(_) => "Fail",
            State::Parallel(_) => "Parallel",
            State::Map(_) => "Map",
        }
    }

    /// Every `(field, target)` pair through which this state names
    /// another state: `Next`, catcher targets, and choice rule /
    /// `Default` targets. The field is relative to the state
    /// (`Catch[0].Next`, `Choices[1].Next`).
    ///
    /// Nested definitions (Parallel branches, Map iterators) are their own
    /// reference scope and do not contribute here.
    pub fn transition_targets(&self) -> Vec<(String, &str)> {
        fn collect<'a>(
            next: &'a Option<String>,
            catch: Option<&'a Vec<Catcher>>,
        ) -> Vec<(String, &'a str)> {
            let mut out = Vec::new();
            if let Some(next) = next {
                out.push(("Next".to_string(), next.as_str()));
            }
            if let Some(catchers) = catch {
                for (index, catcher) in catchers.iter().enumerate() {
                    out.push((format!("Catch[{index}].Next"), catcher.next.as_str()));
                }
            }
            out
        }

        match self {
            State::Pass(s) => collect(&s.next, None),
            State::Wait(s) => collect(&s.next, None),
            State::Task(s) => collect(&s.next, s.catch.as_ref()),
            State::Parallel(s) => collect(&s.next, s.catch.as_ref()),
            State::Map(s) => collect(&s.next, s.catch.as_ref()),
            State::Choice(s) => {
                let mut out: Vec<(String, &str)> = s
                    .default
                    .iter()
                    .map(|d| ("Default".to_string(), d.as_str()))
                    .collect();
                for (index, rule) in s.choices.iter().enumerate() {
                    if let Some(next) = &rule.next {
                        out.push((format!("Choices[{index}].Next"), next.as_str()));
                    }
                }
                out
            }
            State::Succeed(_) | State::Fail(_) => Vec::new(),
        }
    }

    /// Every state name this state can transition to, in
    /// [`transition_targets`](Self::transition_targets) order.
    pub fn transitions(&self) -> Vec<&str> {
        self.transition_targets()
            .into_iter()
            .map(|(_, target)| target)
            .collect()
    }
}

impl<'de> Deserialize<'de> for State {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut object = Map::<String, Value>::deserialize(deserializer)?;
        let tag = object
            .remove("Type")
            .ok_or_else(|| D::Error::missing_field("Type"))?;
        let tag = tag
            .as_str()
            .ok_or_else(|| D::Error::custom("\"Type\" must be a string"))?
            .to_string();
        let rest = Value::Object(object);

        fn variant<'de, D, T>(rest: Value) -> Result<T, D::Error>
        where
            D: Deserializer<'de>,
            T: serde::de::DeserializeOwned,
        {
            serde_json::from_value(rest).map_err(D::Error::custom)
        }

        match tag.as_str() {
            "Pass" => Ok(State::Pass(variant::<D, _>(rest)?)),
            "Task" => Ok(State::Task(variant::<D, _>(rest)?)),
            "Choice" => Ok(State::Choice(variant::<D, _>(rest)?)),
            "Wait" => Ok(State::Wait(variant::<D, _>(rest)?)),
            "Succeed" => Ok(State::Succeed(variant::<D, _>(rest)?)),
            "Fail" => Ok(State::Fail(variant::<D, _>(rest)?)),
            "Parallel" => Ok(State::Parallel(variant::<D, _>(rest)?)),
            "Map" => Ok(State::Map(variant::<D, _>(rest)?)),
            other => Err(D::Error::custom(format!(
                "unknown state type {other:?}, expected one of {}",
                STATE_TYPES.join(", ")
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct PassState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct TaskState {
    pub resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_selector: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat_seconds_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<Vec<Retrier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catch: Option<Vec<Catcher>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct ChoiceState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    pub choices: Vec<ChoiceRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct WaitState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct SucceedState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct FailState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct ParallelState {
    pub branches: Vec<StateMachine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_selector: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<Vec<Retrier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catch: Option<Vec<Catcher>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct MapState {
    pub iterator: Box<StateMachine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_selector: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<Vec<Retrier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catch: Option<Vec<Catcher>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<bool>,
}

// ================================
// Retry / Catch
// ================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct Retrier {
    pub error_equals: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct Catcher {
    pub error_equals: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,
    pub next: String,
}

// ================================
// Choice rules
// ================================

/// Expected JSON shape of a comparison operator's operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Number,
    Bool,
    Timestamp,
    Path,
}

/// One of the fixed ASL comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonOperator {
    name: &'static str,
    kind: ValueKind,
}

impl ComparisonOperator {
    /// Look a field name up in the operator table.
    pub fn from_field(name: &str) -> Option<Self> {
        COMPARISON_OPERATORS.iter().copied().find(|op| op.name == name)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn value_kind(&self) -> ValueKind {
        self.kind
    }
}

const fn op(name: &'static str, kind: ValueKind) -> ComparisonOperator {
    ComparisonOperator { name, kind }
}

/// The full ASL comparison operator table.
pub const COMPARISON_OPERATORS: &[ComparisonOperator] = &[
    op("StringEquals", ValueKind::String),
    op("StringEqualsPath", ValueKind::Path),
    op("StringLessThan", ValueKind::String),
    op("StringLessThanPath", ValueKind::Path),
    op("StringGreaterThan", ValueKind::String),
    op("StringGreaterThanPath", ValueKind::Path),
    op("StringLessThanEquals", ValueKind::String),
    op("StringLessThanEqualsPath", ValueKind::Path),
    op("StringGreaterThanEquals", ValueKind::String),
    op("StringGreaterThanEqualsPath", ValueKind::Path),
    op("StringMatches", ValueKind::String),
    op("NumericEquals", ValueKind::Number),
    op("NumericEqualsPath", ValueKind::Path),
    op("NumericLessThan", ValueKind::Number),
    op("NumericLessThanPath", ValueKind::Path),
    op("NumericGreaterThan", ValueKind::Number),
    op("NumericGreaterThanPath", ValueKind::Path),
    op("NumericLessThanEquals", ValueKind::Number),
    op("NumericLessThanEqualsPath", ValueKind::Path),
    op("NumericGreaterThanEquals", ValueKind::Number),
    op("NumericGreaterThanEqualsPath", ValueKind::Path),
    op("BooleanEquals", ValueKind::Bool),
    op("BooleanEqualsPath", ValueKind::Path),
    op("TimestampEquals", ValueKind::Timestamp),
    op("TimestampEqualsPath", ValueKind::Path),
    op("TimestampLessThan", ValueKind::Timestamp),
    op("TimestampLessThanPath", ValueKind::Path),
    op("TimestampGreaterThan", ValueKind::Timestamp),
    op("TimestampGreaterThanPath", ValueKind::Path),
    op("TimestampLessThanEquals", ValueKind::Timestamp),
    op("TimestampLessThanEqualsPath", ValueKind::Path),
    op("TimestampGreaterThanEquals", ValueKind::Timestamp),
    op("TimestampGreaterThanEqualsPath", ValueKind::Path),
    op("IsNull", ValueKind::Bool),
    op("IsPresent", ValueKind::Bool),
    op("IsNumeric", ValueKind::Bool),
    op("IsString", ValueKind::Bool),
    op("IsBoolean", ValueKind::Bool),
    op("IsTimestamp", ValueKind::Bool),
];

/// A comparison operator applied to an operand value.
#[derive(Debug, Clone)]
pub struct ComparisonTest {
    pub operator: ComparisonOperator,
    pub value: Value,
}

/// One choice rule: either a data-test expression (`Variable` plus one
/// comparison operator) or a boolean expression (`And`/`Or`/`Not` over
/// nested rules). Top-level rules carry `Next`; nested operands must not.
/// Which fields may combine is enforced by the validator; the serde layer
/// only rejects names that are neither known fields nor operators.
#[derive(Debug, Clone, Default)]
pub struct ChoiceRule {
    pub variable: Option<String>,
    pub test: Option<ComparisonTest>,
    pub and: Option<Vec<ChoiceRule>>,
    pub or: Option<Vec<ChoiceRule>>,
    pub not: Option<Box<ChoiceRule>>,
    pub next: Option<String>,
}

impl<'de> Deserialize<'de> for ChoiceRule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        let mut rule = ChoiceRule::default();

        fn string_field<E: serde::de::Error>(field: &str, value: Value) -> Result<String, E> {
            match value {
                Value::String(s) => Ok(s),
                other => Err(E::custom(format!("{field:?} must be a string, got {other}"))),
            }
        }

        for (key, value) in object {
            match key.as_str() {
                "Variable" => rule.variable = Some(string_field(&key, value)?),
                "Next" => rule.next = Some(string_field(&key, value)?),
                "And" => {
                    rule.and = Some(serde_json::from_value(value).map_err(D::Error::custom)?)
                }
                "Or" => rule.or = Some(serde_json::from_value(value).map_err(D::Error::custom)?),
                "Not" => {
                    rule.not =
                        Some(Box::new(serde_json::from_value(value).map_err(D::Error::custom)?))
                }
                other => {
                    let operator = ComparisonOperator::from_field(other).ok_or_else(|| {
                        D::Error::custom(format!(
                            "{other:?} is not a comparison operator or choice rule field"
                        ))
                    })?;
                    if let Some(previous) = &rule.test {
                        return Err(D::Error::custom(format!(
                            "only one comparison operator may be set, found {:?} and {other:?}",
                            previous.operator.name()
                        )));
                    }
                    rule.test = Some(ComparisonTest { operator, value });
                }
            }
        }

        Ok(rule)
    }
}

impl Serialize for ChoiceRule {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        if let Some(variable) = &self.variable {
            map.serialize_entry("Variable", variable)?;
        }
        if let Some(test) = &self.test {
            map.serialize_entry(test.operator.name(), &test.value)?;
        }
        if let Some(and) = &self.and {
            map.serialize_entry("And", and)?;
        }
        if let Some(or) = &self.or {
            map.serialize_entry("Or", or)?;
        }
        if let Some(not) = &self.not {
            map.serialize_entry("Not", not)?;
        }
        if let Some(next) = &self.next {
            map.serialize_entry("Next", next)?;
        }
        map.end()
    }
}

/// Convert a raw definition error into [`ValidationError::Malformed`].
pub(crate) fn malformed(err: impl std::fmt::Display) -> ValidationError {
    ValidationError::Malformed {
        message: err.to_string(),
    }
}
