//! System context detection.
//!
//! Collects the facts the AI needs to produce absolute, runnable commands:
//! PowerShell version, user, well-known folders and drives.

use std::path::{Path, PathBuf};

use serde_derive::{Deserialize, Serialize};
use tracing::debug;

use crate::env::Environment;

/// Timeout for each PowerShell probe
const PROBE_TIMEOUT_MS: u64 = 3_000;
const UNKNOWN: &str = "Unknown";

/// Snapshot of the machine a command is generated for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemContext {
    pub os: String,
    pub architecture: String,
    pub powershell_version: String,
    pub powershell_edition: String,
    pub execution_policy: String,
    pub user_account: String,
    pub user_domain: String,
    pub computer_name: String,
    pub current_location: String,
    pub user_home: String,
    pub desktop_path: String,
    pub documents_path: String,
    pub downloads_path: String,
    pub appdata_path: String,
    pub localappdata_path: String,
    pub programfiles_path: String,
    pub windows_directory: String,
    pub system32_directory: String,
    pub temp_directory: String,
    pub available_drives: Vec<String>,
}

/// Shell binary used for probes.
#[must_use]
pub const fn powershell_binary() -> &'static str {
    if cfg!(windows) {
        "powershell.exe"
    } else {
        "pwsh"
    }
}

fn probe(env: &dyn Environment, script: &str) -> Option<String> {
    env.run_command(
        powershell_binary(),
        &["-NoLogo", "-NoProfile", "-Command", script],
        PROBE_TIMEOUT_MS,
    )
    .filter(|out| !out.is_empty())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Drive roots `A:\` to `Z:\` that exist, for when the PSDrive probe fails.
fn existing_drive_roots(env: &dyn Environment) -> Vec<String> {
    ('A'..='Z')
        .map(|letter| format!("{letter}:\\"))
        .filter(|root| env.path_exists(Path::new(root)))
        .collect()
}

impl SystemContext {
    /// Detect the system context from the given environment.
    ///
    /// Probes that fail leave `Unknown` in place. Drives fall back to the
    /// roots that exist on disk.
    pub fn collect(env: &dyn Environment) -> Self {
        let var_or = |keys: &[&str], default: &str| {
            keys.iter()
                .find_map(|k| env.var(k).filter(|v| !v.is_empty()))
                .unwrap_or_else(|| default.to_string())
        };

        let home = env.home_dir().unwrap_or_default();
        let windows_directory = var_or(&["WINDIR", "SystemRoot"], "C:\\Windows");
        let localappdata_path = var_or(
            &["LOCALAPPDATA"],
            &display(&home.join("AppData").join("Local")),
        );

        let available_drives = probe(
            env,
            "(Get-PSDrive -PSProvider FileSystem).Root -join ','",
        )
        .map(|out| {
            out.split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_else(|| existing_drive_roots(env));

        let ctx = Self {
            os: std::env::consts::OS.to_string(),
            architecture: std::env::consts::ARCH.to_string(),
            powershell_version: probe(env, "$PSVersionTable.PSVersion.ToString()")
                .unwrap_or_else(|| UNKNOWN.into()),
            powershell_edition: probe(env, "$PSVersionTable.PSEdition")
                .unwrap_or_else(|| UNKNOWN.into()),
            execution_policy: probe(env, "Get-ExecutionPolicy").unwrap_or_else(|| UNKNOWN.into()),
            user_account: var_or(&["USERNAME", "USER"], UNKNOWN),
            user_domain: var_or(&["USERDOMAIN"], UNKNOWN),
            computer_name: var_or(&["COMPUTERNAME", "HOSTNAME"], UNKNOWN),
            current_location: env
                .current_dir()
                .map(|p| display(&p))
                .unwrap_or_else(|_| display(&home)),
            desktop_path: display(&home.join("Desktop")),
            documents_path: display(&home.join("Documents")),
            downloads_path: display(&home.join("Downloads")),
            appdata_path: var_or(
                &["APPDATA"],
                &display(&home.join("AppData").join("Roaming")),
            ),
            temp_directory: var_or(
                &["TEMP", "TMP"],
                &display(&PathBuf::from(&localappdata_path).join("Temp")),
            ),
            localappdata_path,
            programfiles_path: var_or(&["ProgramFiles"], "C:\\Program Files"),
            system32_directory: display(&PathBuf::from(&windows_directory).join("System32")),
            windows_directory,
            user_home: display(&home),
            available_drives,
        };
        debug!(context = ?ctx, "system context collected");
        ctx
    }
}
