//! TermiGenius Core - command validation engine
//!
//! This crate holds the pure, I/O free part of termigenius:
//!
//! * [`powershell`] decides whether an AI generated command is a native
//!   PowerShell invocation, rewriting aliases and flagging legacy CMD tokens,
//!   relative paths, unknown verbs and abbreviated parameters.
//! * [`safety`] decides whether a command is safe to run at a given
//!   [`SafetyLevel`], using the embedded YAML [`Check`] patterns.

pub mod checks;
pub mod command;
pub mod errors;
pub mod powershell;
pub mod safety;

pub use checks::{get_all_checks, run_check_on_command, Check, Severity};
pub use errors::{Error, Result};
pub use powershell::{validate_powershell_command, ComplianceVerdict, Issue, IssueSeverity};
pub use safety::{CommandValidator, SafetyLevel, SafetyVerdict};
