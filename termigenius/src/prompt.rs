//! Prompt templates sent to the AI provider.

use crate::context::SystemContext;

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "Unknown".to_string()
    } else {
        items.join(", ")
    }
}

/// Prompt asking for a single native PowerShell command.
#[must_use]
pub fn command_prompt(ctx: &SystemContext, request: &str) -> String {
    format!(
        r#"You are TermiGenius, a Windows PowerShell command generator. Produce exactly one working, native PowerShell command for the user request.

SYSTEM CONTEXT:
- Operating System: {os} ({architecture})
- PowerShell Version: {ps_version} {ps_edition}
- Execution Policy: {policy}
- User Account: {user} (domain {domain})
- Computer Name: {computer}
- Current Location: {cwd}
- Home Directory: {home}
- Desktop Directory: {desktop}
- Documents Directory: {documents}
- Downloads Directory: {downloads}
- AppData Directory: {appdata}
- LocalAppData Directory: {localappdata}
- ProgramFiles Directory: {programfiles}
- Windows Directory: {windir}
- System32 Directory: {system32}
- Temp Directory: {temp}
- Available Drives: {drives}

USER REQUEST: "{request}"

RULES:
1. Use full Verb-Noun cmdlet names only. Never use aliases (gci, ls, cat, ri) or legacy CMD commands (dir, copy, del, cd, type).
2. Use absolute paths built from the system context. Never use .\, ..\, ~\, $env: or %VARIABLE% in paths.
3. Use full parameter names (-Path, -Destination, -Recurse), never abbreviations.
4. Quote paths that contain spaces.
5. Prefer the object pipeline with Where-Object, Select-Object and Sort-Object.

Respond with the command only, inside a single ```powershell code block, with no explanation."#,
        os = ctx.os,
        architecture = ctx.architecture,
        ps_version = ctx.powershell_version,
        ps_edition = ctx.powershell_edition,
        policy = ctx.execution_policy,
        user = ctx.user_account,
        domain = ctx.user_domain,
        computer = ctx.computer_name,
        cwd = ctx.current_location,
        home = ctx.user_home,
        desktop = ctx.desktop_path,
        documents = ctx.documents_path,
        downloads = ctx.downloads_path,
        appdata = ctx.appdata_path,
        localappdata = ctx.localappdata_path,
        programfiles = ctx.programfiles_path,
        windir = ctx.windows_directory,
        system32 = ctx.system32_directory,
        temp = ctx.temp_directory,
        drives = list(&ctx.available_drives),
    )
}

/// Prompt asking for a structured explanation of `command`.
#[must_use]
pub fn explain_prompt(ctx: &SystemContext, command: &str) -> String {
    format!(
        r#"Explain the following Windows PowerShell command for a user about to run it.

System Context: {os} | PowerShell {ps_version} {ps_edition} | User: {user} | Execution Policy: {policy}
Command: "{command}"

Answer with these sections:
1. Summary: what the command does in one sentence.
2. Breakdown: each cmdlet, parameter and pipeline stage.
3. Effects: files, processes, services or settings it changes.
4. Risks: anything destructive or irreversible, and required privileges.
5. Safer alternative: how to preview or limit the change (for example -WhatIf), if relevant."#,
        os = ctx.os,
        ps_version = ctx.powershell_version,
        ps_edition = ctx.powershell_edition,
        user = ctx.user_account,
        policy = ctx.execution_policy,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SystemContext {
        SystemContext {
            user_account: "ada".into(),
            desktop_path: "C:\\Users\\ada\\Desktop".into(),
            available_drives: vec!["C:\\".into(), "D:\\".into()],
            ..SystemContext::default()
        }
    }

    #[test]
    fn command_prompt_embeds_context_and_request() {
        let prompt = command_prompt(&ctx(), "list my desktop");
        assert!(prompt.contains("USER REQUEST: \"list my desktop\""));
        assert!(prompt.contains("Desktop Directory: C:\\Users\\ada\\Desktop"));
        assert!(prompt.contains("Available Drives: C:\\, D:\\"));
    }

    #[test]
    fn empty_drive_list_is_unknown() {
        let prompt = command_prompt(&SystemContext::default(), "x");
        assert!(prompt.contains("Available Drives: Unknown"));
    }

    #[test]
    fn explain_prompt_embeds_command() {
        let prompt = explain_prompt(&ctx(), "Get-Process");
        assert!(prompt.contains("Command: \"Get-Process\""));
        assert!(prompt.contains("User: ada"));
    }
}
