//! TermiGenius turns natural-language requests into native PowerShell
//! commands, checks them for compliance and safety, and runs them on
//! confirmation.

pub mod assistant;
pub mod config;
pub mod context;
pub mod dialog;
pub mod env;
pub mod error;
pub mod executor;
pub mod history;
pub mod llm;
pub mod prompt;
pub mod ui;

pub use config::{Config, ResetMode, Settings};
pub use error::{Error, Result};
pub use termigenius_core::{
    validate_powershell_command, CommandValidator, ComplianceVerdict, SafetyLevel, SafetyVerdict,
};

/// Exit status of a CLI subcommand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdExit {
    pub code: exitcode::ExitCode,
    pub message: Option<String>,
}

impl CmdExit {
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            code: exitcode::OK,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(code: exitcode::ExitCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }
}
