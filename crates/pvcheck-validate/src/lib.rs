//! Rule-based validation of parameter values.
//!
//! Rules are loaded from a settings file ([`load_settings`]), matched against
//! records by anchored name patterns ([`select`]), and applied through their
//! compiled schemas ([`validate`]). [`evaluate`] runs a whole collection and
//! [`Report::build`] turns the result into counts, findings and an exit
//! status.

pub mod engine;
pub mod error;
pub mod pattern;
pub mod report;
pub mod rule;
pub mod schema;
pub mod selector;
pub mod settings;
pub mod validator;
pub mod violation;

pub use engine::{
    Evaluation, OutcomeStatus, RuleViolation, ValidationOutcome, evaluate, evaluate_record,
};
pub use error::{ConfigError, ReportError, Result, RuleError, SchemaError};
pub use pattern::Pattern;
pub use report::{
    ExitStatus, Finding, Report, ReportCounts, ReportEntry, ReportWarning, RuleUsage,
    write_report_json,
};
pub use rule::{EntityPatterns, Rule, RuleId, RuleSet, Selector, SelectorMatch};
pub use schema::{Bound, Schema, TypeName};
pub use selector::{Selection, SelectionWarning, select};
pub use settings::{load_settings, parse_settings};
pub use validator::validate;
pub use violation::{Location, Segment, Violation, ViolationKind};
