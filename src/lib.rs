//! Schema and validator for Amazon States Language state machine
//! definitions.
//!
//! A definition is parsed into a typed [`schema::StateMachine`] and then
//! checked against the structural rules of the language: every state
//! carries the fields its type allows, transitions resolve to defined
//! states, JSONPath and timestamp strings are well formed, and no state
//! is unreachable from `StartAt`.
//!
//! Two entry points cover the two ways callers want failures reported:
//!
//! - [`parse_definition`] / [`validate`] stop at the first problem and
//!   return a [`ValidationError`];
//! - [`check`] runs the same passes to completion and returns a
//!   [`ValidationReport`] carrying every diagnostic found.
//!
//! ```
//! use stepfunctions_asl::parse_definition;
//!
//! let machine = parse_definition(
//!     r#"{
//!         "StartAt": "Hello",
//!         "States": {
//!             "Hello": {"Type": "Pass", "End": true}
//!         }
//!     }"#,
//! )?;
//! assert_eq!(machine.start_at, "Hello");
//! # Ok::<(), stepfunctions_asl::ValidationError>(())
//! ```

pub mod error;
pub mod jsonpath;
pub mod parser;
pub mod schema;
pub mod timestamp;
pub mod validation;

pub use error::{ErrorKind, ValidationError};
pub use parser::{definition_from_value, parse_definition};
pub use schema::{
    Catcher, ChoiceRule, ChoiceState, ComparisonOperator, ComparisonTest, FailState, MapState,
    ParallelState, PassState, Retrier, State, StateMachine, SucceedState, TaskState, ValueKind,
    WaitState,
};
pub use validation::{check, validate, Diagnostic, DiagnosticLevel, ValidationReport};
