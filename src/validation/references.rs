//! Name-reference resolution within one definition scope.
//!
//! `StartAt`, `Next`, catcher targets, and choice targets are stored as
//! state names, not pointers; this pass resolves each against the scope's
//! `States` keys and rejects states no reference can ever reach. Nested
//! definitions (Parallel branches, Map iterators) are separate scopes and
//! are handled by the caller's recursion.

use std::collections::BTreeSet;

use crate::error::ValidationError;
use crate::schema::StateMachine;

use super::{field, Sink};

pub(super) fn validate(
    machine: &StateMachine,
    prefix: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    let defined: BTreeSet<&str> = machine.states.keys().map(String::as_str).collect();
    let mut referenced: BTreeSet<&str> = BTreeSet::new();

    referenced.insert(machine.start_at.as_str());
    if !defined.contains(machine.start_at.as_str()) {
        sink.error(ValidationError::UnknownState {
            path: field(prefix, "StartAt"),
            name: machine.start_at.clone(),
        })?;
    }

    let states_path = field(prefix, "States");
    for (name, state) in &machine.states {
        for (source, target) in state.transition_targets() {
            referenced.insert(target);
            if !defined.contains(target) {
                sink.error(ValidationError::UnknownState {
                    path: format!("{states_path}.{name}.{source}"),
                    name: target.to_string(),
                })?;
            }
        }
    }

    for name in defined.difference(&referenced) {
        sink.error(ValidationError::UnreachableState {
            path: states_path.clone(),
            name: (*name).to_string(),
        })?;
    }

    Ok(())
}
