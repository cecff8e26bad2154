use clap::{value_parser, Arg, ArgMatches, Command};
use termigenius::{error::Result, ui, CmdExit, Config, Settings};

const DEFAULT_LIMIT: usize = 10;

fn limit_arg() -> Arg {
    Arg::new("limit")
        .short('l')
        .long("limit")
        .help("Maximum number of entries to show")
        .value_parser(value_parser!(usize))
        .default_value("10")
}

pub fn command() -> Command {
    Command::new("history")
        .about("View and manage the command history")
        .subcommand(
            Command::new("show")
                .about("Show the most recent commands")
                .arg(limit_arg()),
        )
        .subcommand(
            Command::new("search")
                .about("Search prompts and commands")
                .arg(Arg::new("query").required(true))
                .arg(limit_arg()),
        )
        .subcommand(Command::new("clear").about("Delete the command history"))
        .subcommand(Command::new("stats").about("Show history statistics"))
}

fn limit(matches: &ArgMatches) -> usize {
    matches
        .get_one::<usize>("limit")
        .copied()
        .unwrap_or(DEFAULT_LIMIT)
}

pub fn run(matches: &ArgMatches, config: &Config, settings: &Settings) -> Result<CmdExit> {
    let history = config.history(settings);
    match matches.subcommand() {
        None => {
            println!("{}", ui::render_history(&history.recent(DEFAULT_LIMIT)?));
            Ok(CmdExit::ok())
        }
        Some(("show", sub)) => {
            println!("{}", ui::render_history(&history.recent(limit(sub))?));
            Ok(CmdExit::ok())
        }
        Some(("search", sub)) => {
            let query = sub.get_one::<String>("query").map_or("", String::as_str);
            println!("{}", ui::render_history(&history.search(query, limit(sub))?));
            Ok(CmdExit::ok())
        }
        Some(("clear", _)) => {
            history.clear()?;
            Ok(CmdExit::with_message(exitcode::OK, "History cleared."))
        }
        Some(("stats", _)) => {
            println!("{}", ui::render_stats(&history.stats()?));
            Ok(CmdExit::ok())
        }
        _ => Ok(CmdExit::with_message(
            exitcode::USAGE,
            "Unknown history subcommand.",
        )),
    }
}
