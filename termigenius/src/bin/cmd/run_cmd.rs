use clap::{Arg, ArgAction, ArgMatches, Command};
use termigenius::{
    assistant::{Assistant, Options, Outcome},
    dialog::RealPrompter,
    env::RealEnvironment,
    error::Result,
    llm, ui, CmdExit, Config, Settings,
};

pub fn command() -> Command {
    Command::new("run")
        .about("Generate a PowerShell command from a request and run it after confirmation")
        .arg(
            Arg::new("prompt")
                .help("What you want to do, in plain language")
                .required(true)
                .num_args(1..),
        )
        .arg(
            Arg::new("explain")
                .short('e')
                .long("explain")
                .help("Explain the generated command instead of running it")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Show the generated command without running it")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("safe-mode")
                .short('s')
                .long("safe-mode")
                .help("Only allow read-only commands")
                .action(ArgAction::SetTrue),
        )
}

pub fn options(matches: &ArgMatches) -> Options {
    Options {
        explain: matches.get_flag("explain"),
        dry_run: matches.get_flag("dry-run"),
        strict: matches.get_flag("safe-mode"),
    }
}

pub fn run(matches: &ArgMatches, config: &Config, settings: &Settings) -> Result<CmdExit> {
    let prompt = matches
        .get_many::<String>("prompt")
        .map(|words| words.map(String::as_str).collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    let env = RealEnvironment;
    let provider = llm::create_provider(settings, &env);
    let prompter = RealPrompter;
    let assistant = Assistant::new(
        settings,
        &env,
        provider.as_ref(),
        &prompter,
        config.history(settings),
    );

    let outcome = assistant.process_prompt(&prompt, options(matches));
    println!("{}", ui::render_outcome(&outcome));
    Ok(CmdExit {
        code: exit_code(&outcome),
        message: None,
    })
}

pub fn exit_code(outcome: &Outcome) -> exitcode::ExitCode {
    match outcome {
        Outcome::Failed { .. } => exitcode::UNAVAILABLE,
        Outcome::Rejected { .. } => exitcode::NOPERM,
        Outcome::Explained { .. } | Outcome::DryRun { .. } | Outcome::Cancelled { .. } => {
            exitcode::OK
        }
        Outcome::Executed { result, .. } if result.success => exitcode::OK,
        Outcome::Executed { result, .. } if result.return_code > 0 => result.return_code,
        Outcome::Executed { .. } => exitcode::SOFTWARE,
    }
}
