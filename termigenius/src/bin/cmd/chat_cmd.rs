use clap::{Arg, ArgAction, ArgMatches, Command};
use console::style;
use termigenius::{
    assistant::{Assistant, Options},
    dialog::RealPrompter,
    env::RealEnvironment,
    error::Result,
    llm::{self, LlmProvider},
    ui, CmdExit, Config, Settings,
};

pub fn command() -> Command {
    Command::new("chat")
        .about("Interactive session, one request per line (quit, exit or bye to leave)")
        .arg(
            Arg::new("safe-mode")
                .short('s')
                .long("safe-mode")
                .help("Only allow read-only commands")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Show generated commands without running them")
                .action(ArgAction::SetTrue),
        )
}

pub fn run(matches: &ArgMatches, config: &Config, settings: &Settings) -> Result<CmdExit> {
    let env = RealEnvironment;
    let provider = llm::create_provider(settings, &env);
    if !provider.is_available() {
        return Ok(CmdExit::with_message(
            exitcode::CONFIG,
            "AI provider is not configured. Set GEMINI_API_KEY or run `termigenius config set-key`",
        ));
    }

    let prompter = RealPrompter;
    let assistant = Assistant::new(
        settings,
        &env,
        provider.as_ref(),
        &prompter,
        config.history(settings),
    );
    let options = Options {
        explain: false,
        dry_run: matches.get_flag("dry-run"),
        strict: matches.get_flag("safe-mode"),
    };

    println!(
        "{} safety level {}, type {} to leave",
        style("TermiGenius chat").bold(),
        style(settings.safety_level).cyan(),
        style("exit").bold()
    );
    let processed = assistant.chat(options, |outcome| {
        println!("{}\n", ui::render_outcome(outcome));
    })?;

    Ok(CmdExit::with_message(
        exitcode::OK,
        format!("Goodbye! {processed} request(s) handled."),
    ))
}
