use clap::{Arg, ArgMatches, Command};
use termigenius::{
    env::RealEnvironment,
    llm::{self, LlmProvider},
    CmdExit, Settings,
};

pub fn command() -> Command {
    Command::new("ask")
        .about("Ask the AI provider a question directly, without system context")
        .arg(
            Arg::new("prompt")
                .help("Question to send")
                .required(true)
                .num_args(1..),
        )
}

pub fn run(matches: &ArgMatches, settings: &Settings) -> CmdExit {
    let question = matches
        .get_many::<String>("prompt")
        .map(|words| words.map(String::as_str).collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    let provider = llm::create_provider(settings, &RealEnvironment);
    match provider.ask(&question) {
        Ok(answer) => {
            println!("{}", answer.trim_end());
            CmdExit::ok()
        }
        Err(err) => CmdExit::with_message(exitcode::UNAVAILABLE, err.to_string()),
    }
}
