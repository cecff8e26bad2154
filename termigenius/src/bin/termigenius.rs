mod cmd;

use std::process::exit;

use clap::parser::ValueSource;
use console::{style, Style};
use termigenius::{env::RealEnvironment, Config};
use tracing_subscriber::EnvFilter;

const DEFAULT_ERR_EXIT_CODE: i32 = 1;

/// `--log` on the command line wins over `RUST_LOG`, which wins over the
/// level derived from the `verbose` setting.
fn init_logging(matches: &clap::ArgMatches, default_level: &str) {
    let filter = match matches.get_one::<String>("log") {
        Some(level) if matches.value_source("log") == Some(ValueSource::CommandLine) => {
            EnvFilter::new(level)
        }
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    dotenvy::dotenv().ok();

    let app = cmd::default::command()
        .subcommand(cmd::run_cmd::command())
        .subcommand(cmd::chat_cmd::command())
        .subcommand(cmd::validate_cmd::command())
        .subcommand(cmd::history_cmd::command())
        .subcommand(cmd::config_cmd::command())
        .subcommand(cmd::ask_cmd::command());

    let matches = app.get_matches();

    // load configuration
    let config = match Config::new(matches.get_one::<String>("config").map(String::as_str)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Loading config error: {err}");
            exit(exitcode::CONFIG)
        }
    };

    // log level comes from the file alone; env overrides load after the subscriber
    let default_level = config
        .get_settings_from_file()
        .map_or("info", |settings| settings.default_log_level());
    init_logging(&matches, default_level);

    let env = RealEnvironment;
    let settings = match config.load_settings(&env) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!(
                "Could not load config from file. Try resolving by running `{}`\nError: {e}",
                style("termigenius config reset").bold().italic().underlined(),
            );
            exit(exitcode::CONFIG)
        }
    };

    if !settings.use_colors {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let res = match matches.subcommand() {
        Some(("run", sub)) => cmd::run_cmd::run(sub, &config, &settings),
        Some(("chat", sub)) => cmd::chat_cmd::run(sub, &config, &settings),
        Some(("validate", sub)) => Ok(cmd::validate_cmd::run(sub, &settings)),
        Some(("history", sub)) => cmd::history_cmd::run(sub, &config, &settings),
        Some(("config", sub)) => cmd::config_cmd::run(sub, &config),
        Some(("ask", sub)) => Ok(cmd::ask_cmd::run(sub, &settings)),
        _ => unreachable!(),
    };

    let exit_with = match res {
        Ok(cmd) => {
            if let Some(message) = cmd.message {
                let style = if exitcode::is_success(cmd.code) {
                    Style::new().green()
                } else {
                    Style::new().red()
                };
                eprintln!("{}", style.apply_to(message));
            }
            cmd.code
        }
        Err(e) => {
            tracing::debug!("{e:?}");
            eprintln!("{} {e}", style("Error:").red().bold());
            DEFAULT_ERR_EXIT_CODE
        }
    };
    exit(exit_with)
}
