//! Sandboxed integration tests: the full request pipeline with
//! MockEnvironment, MockLlmProvider and MockPrompter.
//!
//! Nothing here touches the real system. History files live in temporary
//! directories.

use std::path::PathBuf;

use termigenius::{
    assistant::{Assistant, Options, Outcome},
    dialog::MockPrompter,
    env::MockEnvironment,
    executor::ExecutionResult,
    history::History,
    llm::{create_provider, MockLlmProvider},
    SafetyLevel, Settings,
};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn mock_env() -> MockEnvironment {
    let mut env = MockEnvironment {
        cwd: PathBuf::from("C:\\Users\\ada"),
        home: Some(PathBuf::from("C:\\Users\\ada")),
        ..MockEnvironment::default()
    };
    env.env_vars.insert("USERNAME".into(), "ada".into());
    env
}

fn temp_history() -> (tempfile::TempDir, History) {
    let temp = tempfile::tempdir().unwrap();
    let history = History::new(temp.path().join("history.jsonl"), true, 100);
    (temp, history)
}

fn run_with(
    settings: &Settings,
    env: &MockEnvironment,
    provider: &MockLlmProvider,
    prompter: &MockPrompter,
    history: History,
    prompt: &str,
    options: Options,
) -> (Outcome, usize) {
    let assistant = Assistant::new(settings, env, provider, prompter, history);
    let outcome = assistant.process_prompt(prompt, options);
    let recorded = assistant.history().load().unwrap().len();
    (outcome, recorded)
}

// ---------------------------------------------------------------------------
// Safety gate
// ---------------------------------------------------------------------------

#[test]
fn test_dangerous_command_is_rejected_before_confirmation() {
    let (_temp, history) = temp_history();
    let env = mock_env();
    let provider = MockLlmProvider::responding("```powershell\nFormat-Volume -DriveLetter D\n```");
    let prompter = MockPrompter::confirming(&[true]);

    let (outcome, recorded) = run_with(
        &Settings::default(),
        &env,
        &provider,
        &prompter,
        history,
        "wipe drive d",
        Options::default(),
    );

    match outcome {
        Outcome::Rejected {
            command,
            reason,
            suggestion,
        } => {
            assert_eq!(command, "Format-Volume -DriveLetter D");
            assert!(reason.starts_with("Dangerous pattern detected:"));
            assert!(suggestion.is_some());
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert!(prompter.asked_messages().is_empty());
    assert!(env.executed_commands().is_empty());
    assert_eq!(recorded, 0);
}

#[test]
fn test_strict_mode_blocks_state_changes() {
    let (_temp, history) = temp_history();
    let env = mock_env();
    let provider = MockLlmProvider::responding("Stop-Service -Name Spooler");
    let prompter = MockPrompter::confirming(&[true]);

    let (outcome, _) = run_with(
        &Settings::default(),
        &env,
        &provider,
        &prompter,
        history,
        "stop the print spooler",
        Options {
            strict: true,
            ..Options::default()
        },
    );

    assert!(matches!(
        outcome,
        Outcome::Rejected { ref reason, .. } if reason == "Command 'stop-service' not in safe command list"
    ));
    assert!(env.executed_commands().is_empty());
}

#[test]
fn test_high_safety_level_runs_read_only_commands() {
    let (_temp, history) = temp_history();
    let settings = Settings {
        safety_level: SafetyLevel::High,
        auto_confirm: true,
        ..Settings::default()
    };
    let env = mock_env();
    let provider = MockLlmProvider::responding("Get-ChildItem -Path C:\\Users\\ada\\Desktop");
    let prompter = MockPrompter::default();

    let (outcome, recorded) = run_with(
        &settings,
        &env,
        &provider,
        &prompter,
        history,
        "list my desktop",
        Options::default(),
    );

    assert!(matches!(outcome, Outcome::Executed { .. }));
    assert_eq!(
        env.executed_commands(),
        vec!["Get-ChildItem -Path C:\\Users\\ada\\Desktop"]
    );
    assert_eq!(recorded, 1);
}

#[test]
fn test_risky_command_warns_in_confirmation() {
    let (_temp, history) = temp_history();
    let env = mock_env();
    let provider = MockLlmProvider::responding("Stop-Process -Name notepad -Force");
    let prompter = MockPrompter::confirming(&[true]);

    let (outcome, _) = run_with(
        &Settings::default(),
        &env,
        &provider,
        &prompter,
        history,
        "kill notepad",
        Options::default(),
    );

    match outcome {
        Outcome::Executed { warning, .. } => {
            let warning = warning.expect("warning expected");
            assert!(warning.starts_with("Potentially risky command detected:"));
        }
        other => panic!("expected execution, got {other:?}"),
    }
    let asked = prompter.asked_messages();
    assert_eq!(asked.len(), 1);
    assert!(asked[0].contains("anyway"));
}

// ---------------------------------------------------------------------------
// Explain, dry run and confirmation
// ---------------------------------------------------------------------------

#[test]
fn test_explain_does_not_execute() {
    let (_temp, history) = temp_history();
    let env = mock_env();
    let provider = MockLlmProvider {
        response: "Get-Process".into(),
        explanation: "Lists running processes.".into(),
        ..MockLlmProvider::default()
    };
    let prompter = MockPrompter::default();

    let (outcome, recorded) = run_with(
        &Settings::default(),
        &env,
        &provider,
        &prompter,
        history,
        "what is running",
        Options {
            explain: true,
            ..Options::default()
        },
    );

    assert_eq!(
        outcome,
        Outcome::Explained {
            command: "Get-Process".into(),
            explanation: "Lists running processes.".into(),
        }
    );
    assert!(env.executed_commands().is_empty());
    assert_eq!(recorded, 0);
}

#[test]
fn test_dry_run_skips_confirmation_and_execution() {
    let (_temp, history) = temp_history();
    let env = mock_env();
    let provider = MockLlmProvider::responding("ps");
    let prompter = MockPrompter::confirming(&[true]);

    let (outcome, _) = run_with(
        &Settings::default(),
        &env,
        &provider,
        &prompter,
        history,
        "show processes",
        Options {
            dry_run: true,
            ..Options::default()
        },
    );

    assert_eq!(
        outcome,
        Outcome::DryRun {
            command: "Get-Process".into(),
            warning: None,
        }
    );
    assert!(prompter.asked_messages().is_empty());
    assert!(env.executed_commands().is_empty());
}

#[test]
fn test_auto_confirm_executes_without_asking() {
    let (_temp, history) = temp_history();
    let settings = Settings {
        auto_confirm: true,
        ..Settings::default()
    };
    let env = mock_env();
    let provider = MockLlmProvider::responding("Get-Date");
    let prompter = MockPrompter::default();

    let (outcome, recorded) = run_with(
        &settings,
        &env,
        &provider,
        &prompter,
        history,
        "what day is it",
        Options::default(),
    );

    assert!(matches!(outcome, Outcome::Executed { .. }));
    assert!(prompter.asked_messages().is_empty());
    assert_eq!(recorded, 1);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn test_provider_error_fails_request() {
    let (_temp, history) = temp_history();
    let env = mock_env();
    let provider = MockLlmProvider {
        error: Some("quota exceeded".into()),
        ..MockLlmProvider::default()
    };
    let prompter = MockPrompter::confirming(&[true]);

    let (outcome, _) = run_with(
        &Settings::default(),
        &env,
        &provider,
        &prompter,
        history,
        "anything",
        Options::default(),
    );

    assert_eq!(
        outcome,
        Outcome::Failed {
            error: "quota exceeded".into()
        }
    );
    assert!(env.executed_commands().is_empty());
}

#[test]
fn test_unconfigured_provider_fails_request() {
    let (_temp, history) = temp_history();
    let env = mock_env();
    let provider = create_provider(&Settings::default(), &env);
    let prompter = MockPrompter::confirming(&[true]);
    let settings = Settings::default();
    let assistant = Assistant::new(&settings, &env, provider.as_ref(), &prompter, history);

    let outcome = assistant.process_prompt("list files", Options::default());
    assert!(matches!(
        outcome,
        Outcome::Failed { ref error } if error.contains("GEMINI_API_KEY")
    ));
}

#[test]
fn test_failed_execution_is_recorded() {
    let (_temp, history) = temp_history();
    let mut env = mock_env();
    env.executions.insert(
        "Get-Service -Name Missing".into(),
        ExecutionResult {
            success: false,
            output: String::new(),
            error: "Cannot find any service with service name 'Missing'.".into(),
            return_code: 1,
            execution_time: 0.3,
        },
    );
    let provider = MockLlmProvider::responding("Get-Service -Name Missing");
    let prompter = MockPrompter::confirming(&[true]);
    let settings = Settings::default();
    let assistant = Assistant::new(&settings, &env, &provider, &prompter, history);

    let outcome = assistant.process_prompt("status of missing service", Options::default());
    assert!(matches!(outcome, Outcome::Executed { ref result, .. } if !result.success));

    let entries = assistant.history().load().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].success);
    assert_eq!(entries[0].command, "Get-Service -Name Missing");
}

#[test]
fn test_history_write_failure_is_not_fatal() {
    let temp = tempfile::tempdir().unwrap();
    let blocker = temp.path().join("not-a-dir");
    std::fs::write(&blocker, "x").unwrap();
    let history = History::new(blocker.join("history.jsonl"), true, 100);

    let env = mock_env();
    let provider = MockLlmProvider::responding("Get-Date");
    let prompter = MockPrompter::confirming(&[true]);
    let settings = Settings::default();
    let assistant = Assistant::new(&settings, &env, &provider, &prompter, history);

    let outcome = assistant.process_prompt("time", Options::default());
    assert!(matches!(outcome, Outcome::Executed { ref result, .. } if result.success));
}

#[test]
fn test_disabled_history_records_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let history = History::new(temp.path().join("history.jsonl"), false, 100);
    let env = mock_env();
    let provider = MockLlmProvider::responding("Get-Date");
    let prompter = MockPrompter::confirming(&[true]);

    let (outcome, recorded) = run_with(
        &Settings::default(),
        &env,
        &provider,
        &prompter,
        history,
        "time",
        Options::default(),
    );

    assert!(matches!(outcome, Outcome::Executed { .. }));
    assert_eq!(recorded, 0);
    assert!(!temp.path().join("history.jsonl").exists());
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[test]
fn test_chat_session_until_end_of_input() {
    let (_temp, history) = temp_history();
    let settings = Settings {
        auto_confirm: true,
        ..Settings::default()
    };
    let env = mock_env();
    let provider = MockLlmProvider::responding("Get-Date");
    let prompter = MockPrompter::default().with_inputs(&["what time is it", "and now?"]);
    let assistant = Assistant::new(&settings, &env, &provider, &prompter, history);

    let mut outcomes = vec![];
    let processed = assistant
        .chat(Options::default(), |o| outcomes.push(o.clone()))
        .unwrap();

    assert_eq!(processed, 2);
    assert_eq!(env.executed_commands(), vec!["Get-Date", "Get-Date"]);
    let prompts: Vec<String> = assistant
        .history()
        .load()
        .unwrap()
        .into_iter()
        .map(|e| e.prompt)
        .collect();
    assert_eq!(prompts, vec!["what time is it", "and now?"]);
}
