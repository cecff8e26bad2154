//! Static lookup tables for the compliance checker.

/// Shorthand and legacy tokens mapped to their canonical PowerShell form.
///
/// Keys are lowercase. Order matters only for reporting, substitutions are
/// independent of each other.
pub const ALIASES: &[(&str, &str)] = &[
    ("gci", "Get-ChildItem"),
    ("dir", "Get-ChildItem"),
    ("ls", "Get-ChildItem"),
    ("copy", "Copy-Item"),
    ("cp", "Copy-Item"),
    ("move", "Move-Item"),
    ("mv", "Move-Item"),
    ("del", "Remove-Item"),
    ("rm", "Remove-Item"),
    ("md", "New-Item -ItemType Directory"),
    ("mkdir", "New-Item -ItemType Directory"),
    ("cd", "Set-Location"),
    ("pwd", "Get-Location"),
    ("cat", "Get-Content"),
    ("type", "Get-Content"),
    ("echo", "Write-Output"),
    ("cls", "Clear-Host"),
    ("ps", "Get-Process"),
    ("kill", "Stop-Process"),
    ("start", "Start-Process"),
    ("svc", "Get-Service"),
    ("gsv", "Get-Service"),
    ("sasv", "Start-Service"),
    ("spsv", "Stop-Service"),
    ("gi", "Get-Item"),
    ("si", "Set-Item"),
    ("ni", "New-Item"),
    ("ri", "Remove-Item"),
];

/// Legacy CMD commands that must never appear as a standalone token.
pub const FORBIDDEN: &[&str] = &[
    "dir",
    "copy",
    "move",
    "del",
    "md",
    "mkdir",
    "rd",
    "rmdir",
    "cd",
    "chdir",
    "type",
    "find",
    "findstr",
    "cls",
    "echo",
    "set",
    "path",
    "attrib",
    "xcopy",
    "robocopy",
    "net",
    "sc",
    "reg",
    "wmic",
    "systeminfo",
];

/// Verbs accepted as the prefix of a `Verb-Noun` cmdlet.
///
/// The approved `Get-Verb` list plus the verbs of the common built-in cmdlets
/// that predate it (`Where-Object`, `ForEach-Object`, `Sort-Object`,
/// `Tee-Object`).
pub const VERBS: &[&str] = &[
    // common
    "Add",
    "Clear",
    "Close",
    "Copy",
    "Enter",
    "Exit",
    "Find",
    "Format",
    "Get",
    "Hide",
    "Join",
    "Lock",
    "Move",
    "New",
    "Open",
    "Optimize",
    "Pop",
    "Push",
    "Redo",
    "Remove",
    "Rename",
    "Reset",
    "Resize",
    "Search",
    "Select",
    "Set",
    "Show",
    "Skip",
    "Split",
    "Step",
    "Switch",
    "Undo",
    "Unlock",
    "Watch",
    // communications
    "Connect",
    "Disconnect",
    "Read",
    "Receive",
    "Send",
    "Write",
    // data
    "Backup",
    "Checkpoint",
    "Compare",
    "Compress",
    "Convert",
    "ConvertFrom",
    "ConvertTo",
    "Dismount",
    "Edit",
    "Expand",
    "Export",
    "Group",
    "Import",
    "Initialize",
    "Limit",
    "Merge",
    "Mount",
    "Out",
    "Publish",
    "Restore",
    "Save",
    "Sync",
    "Unpublish",
    "Update",
    // diagnostic
    "Debug",
    "Measure",
    "Ping",
    "Repair",
    "Resolve",
    "Test",
    "Trace",
    // lifecycle
    "Approve",
    "Assert",
    "Build",
    "Complete",
    "Confirm",
    "Deny",
    "Deploy",
    "Disable",
    "Enable",
    "Install",
    "Invoke",
    "Register",
    "Request",
    "Restart",
    "Resume",
    "Start",
    "Stop",
    "Submit",
    "Suspend",
    "Uninstall",
    "Unregister",
    "Wait",
    // security
    "Block",
    "Grant",
    "Protect",
    "Revoke",
    "Unblock",
    "Unprotect",
    // other
    "Use",
    // built-ins outside the approved list
    "ForEach",
    "Sort",
    "Tee",
    "Where",
    "Verbose",
];

/// `(alias, canonical)` table entry for `word`, ignoring case.
#[must_use]
pub fn lookup_alias(word: &str) -> Option<(&'static str, &'static str)> {
    ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(word))
        .copied()
}

#[must_use]
pub fn is_forbidden(token: &str) -> bool {
    FORBIDDEN.iter().any(|f| f.eq_ignore_ascii_case(token))
}

#[must_use]
pub fn is_known_verb(verb: &str) -> bool {
    VERBS.iter().any(|v| v.eq_ignore_ascii_case(verb))
}
