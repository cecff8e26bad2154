use clap::{value_parser, Arg, ArgMatches, Command};
use strum::IntoEnumIterator;
use termigenius::{
    config::mask_key,
    dialog::{Prompter, RealPrompter},
    error::Result,
    CmdExit, Config, SafetyLevel, Settings,
};

pub fn command() -> Command {
    Command::new("config")
        .about("Manage termigenius configuration")
        .subcommand(Command::new("show").about("Show current configuration"))
        .subcommand(
            Command::new("set-key")
                .about("Store the Gemini API key")
                .arg(Arg::new("key").help("API key, prompted for when omitted")),
        )
        .subcommand(
            Command::new("safety-level")
                .about("Set the safety level")
                .arg(
                    Arg::new("level")
                        .help("Safety level: low, medium or high")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("auto-confirm")
                .about("Run generated commands without asking")
                .arg(
                    Arg::new("value")
                        .help("true or false")
                        .required(true)
                        .value_parser(value_parser!(bool)),
                ),
        )
        .subcommand(Command::new("reset").about("Reset configuration to defaults"))
}

pub fn run(matches: &ArgMatches, config: &Config) -> Result<CmdExit> {
    let prompter = RealPrompter;
    match matches.subcommand() {
        None | Some(("show", _)) => run_show(config),
        Some(("set-key", sub)) => {
            run_set_key(config, sub.get_one::<String>("key").map(String::as_str), &prompter)
        }
        Some(("safety-level", sub)) => {
            run_safety_level(config, sub.get_one::<String>("level").map_or("", String::as_str))
        }
        Some(("auto-confirm", sub)) => {
            let value = sub.get_one::<bool>("value").copied().unwrap_or(false);
            config.update_auto_confirm(value)?;
            Ok(CmdExit::with_message(
                exitcode::OK,
                format!("auto_confirm set to {value}"),
            ))
        }
        Some(("reset", _)) => run_reset(config, &prompter),
        _ => unreachable!(),
    }
}

pub fn run_show(config: &Config) -> Result<CmdExit> {
    let settings = config.get_settings_from_file()?;
    println!(
        "{}",
        format_settings_display(&settings, &config.setting_file_path)
    );
    Ok(CmdExit::ok())
}

fn format_settings_display(settings: &Settings, config_path: &std::path::Path) -> String {
    let enabled = |flag: bool| if flag { "enabled" } else { "disabled" };
    let api_key = settings
        .api_key()
        .map_or_else(|| "(not set)".to_string(), mask_key);

    [
        format!("config:         {}", config_path.display()),
        String::new(),
        format!("ai_provider:    {}", settings.ai_provider),
        format!("model:          {}", settings.model),
        format!("api_key:        {api_key}"),
        format!("safety_level:   {}", settings.safety_level),
        format!("auto_confirm:   {}", settings.auto_confirm),
        format!(
            "history:        {} (max {})",
            enabled(settings.history_enabled),
            settings.max_history
        ),
        format!("timeout:        {}s", settings.timeout_secs),
        format!("llm_timeout:    {}ms", settings.llm_timeout_ms),
        format!("colors:         {}", enabled(settings.use_colors)),
        format!("verbose:        {}", settings.verbose),
    ]
    .join("\n")
}

fn run_set_key(config: &Config, key: Option<&str>, prompter: &dyn Prompter) -> Result<CmdExit> {
    let key = match key {
        Some(key) => key.to_string(),
        None => match prompter.input("Gemini API key:")? {
            Some(key) => key,
            None => {
                return Ok(CmdExit::with_message(exitcode::OK, "No key entered."));
            }
        },
    };
    config.update_api_key(&key)?;
    Ok(CmdExit::with_message(
        exitcode::OK,
        format!("API key saved ({})", mask_key(key.trim())),
    ))
}

fn run_safety_level(config: &Config, level: &str) -> Result<CmdExit> {
    match level.parse::<SafetyLevel>() {
        Ok(level) => {
            config.update_safety_level(level)?;
            Ok(CmdExit::with_message(
                exitcode::OK,
                format!("safety_level set to {level}"),
            ))
        }
        Err(e) => {
            let levels: Vec<String> = SafetyLevel::iter().map(|l| l.to_string()).collect();
            Ok(CmdExit::with_message(
                exitcode::USAGE,
                format!("{e}. Expected one of: {}", levels.join(", ")),
            ))
        }
    }
}

pub fn run_reset(config: &Config, prompter: &dyn Prompter) -> Result<CmdExit> {
    let Some(mode) = prompter.select_reset_mode()? else {
        return Ok(CmdExit::with_message(exitcode::OK, "Reset cancelled."));
    };
    match config.reset_config(mode) {
        Ok(Some(backup)) => Ok(CmdExit::with_message(
            exitcode::OK,
            format!(
                "termigenius configuration reset successfully, previous settings saved to {}",
                backup.display()
            ),
        )),
        Ok(None) => Ok(CmdExit::with_message(
            exitcode::OK,
            "termigenius configuration reset successfully",
        )),
        Err(e) => Ok(CmdExit::with_message(
            exitcode::CONFIG,
            format!("reset settings error: {e}"),
        )),
    }
}
