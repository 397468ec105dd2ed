//! Cross-field and cross-state validation of parsed definitions.
//!
//! Two entry points over the same passes: [`validate`] stops at the first
//! failure (the construction contract), [`check`] runs every pass to
//! completion and returns a [`ValidationReport`] of all findings.

mod fields;
mod references;
mod types;

use tracing::debug;

use crate::error::ValidationError;
use crate::schema::{State, StateMachine};

pub use types::{Diagnostic, DiagnosticLevel, ValidationReport};

/// Validate a definition, failing on the first violation found.
///
/// Checks run in declaration order per scope: definition-level shape,
/// per-state field constraints, name references, then nested definitions
/// (Parallel branches and Map iterators) recursively. Errors from nested
/// scopes carry a path prefix such as `States.X.Branches[2]`.
pub fn validate(machine: &StateMachine) -> Result<(), ValidationError> {
    let mut sink = Sink::fail_fast();
    validate_scope(machine, "", &mut sink)?;
    debug!(states = machine.states.len(), "definition validated");
    Ok(())
}

/// Validate a definition without short-circuiting and report every
/// finding, warnings included.
pub fn check(machine: &StateMachine) -> ValidationReport {
    let mut sink = Sink::collecting();
    // A collecting sink never returns an error.
    let _ = validate_scope(machine, "", &mut sink);
    sink.into_report()
}

fn validate_scope(
    machine: &StateMachine,
    prefix: &str,
    sink: &mut Sink,
) -> Result<(), ValidationError> {
    fields::validate(machine, prefix, sink)?;

    // Reference resolution over an empty scope would only repeat the
    // empty-States finding as a dangling StartAt.
    if !machine.states.is_empty() {
        references::validate(machine, prefix, sink)?;
    }

    for (name, state) in &machine.states {
        let state_path = format!("{}.{name}", field(prefix, "States"));
        match state {
            State::Parallel(parallel) => {
                for (index, branch) in parallel.branches.iter().enumerate() {
                    validate_scope(branch, &format!("{state_path}.Branches[{index}]"), sink)?;
                }
            }
            State::Map(map) => {
                validate_scope(&map.iterator, &format!("{state_path}.Iterator"), sink)?;
            }
            _ => {}
        }
    }

    Ok(())
}

/// Join a scope prefix and a field name into a dotted path.
fn field(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Where the passes deliver their findings: short-circuit in fail-fast
/// mode, accumulate in collecting mode.
struct Sink {
    fail_fast: bool,
    diagnostics: Vec<Diagnostic>,
}

impl Sink {
    fn fail_fast() -> Self {
        Sink {
            fail_fast: true,
            diagnostics: Vec::new(),
        }
    }

    fn collecting() -> Self {
        Sink {
            fail_fast: false,
            diagnostics: Vec::new(),
        }
    }

    fn error(&mut self, err: ValidationError) -> Result<(), ValidationError> {
        if self.fail_fast {
            return Err(err);
        }
        self.diagnostics.push(Diagnostic::from_error(&err));
        Ok(())
    }

    fn warn(&mut self, code: &str, path: String, message: String) {
        if self.fail_fast {
            return;
        }
        self.diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Warning,
            code: code.to_string(),
            path: Some(path),
            message,
        });
    }

    fn into_report(self) -> ValidationReport {
        let is_valid = self
            .diagnostics
            .iter()
            .all(|d| d.level != DiagnosticLevel::Error);
        ValidationReport {
            is_valid,
            diagnostics: self.diagnostics,
        }
    }
}
