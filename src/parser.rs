//! Construction entry points: JSON document in, validated definition out.

use serde_json::Value;
use tracing::debug;

use crate::error::ValidationError;
use crate::schema::{malformed, StateMachine};
use crate::validation;

/// Parse a JSON string into a fully validated [`StateMachine`].
///
/// Either returns a usable definition or fails with the first
/// [`ValidationError`] found; partial objects are never returned.
pub fn parse_definition(content: &str) -> Result<StateMachine, ValidationError> {
    let machine: StateMachine = serde_json::from_str(content).map_err(malformed)?;
    validation::validate(&machine)?;
    debug!(states = machine.states.len(), "parsed state-machine definition");
    Ok(machine)
}

/// Build a fully validated [`StateMachine`] from an in-memory JSON value.
pub fn definition_from_value(value: Value) -> Result<StateMachine, ValidationError> {
    let machine: StateMachine = serde_json::from_value(value).map_err(malformed)?;
    validation::validate(&machine)?;
    Ok(machine)
}
