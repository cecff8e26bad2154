use clap::{Arg, ArgAction, ArgMatches, Command};
use termigenius::{ui, CmdExit, CommandValidator, Settings};
use termigenius_core::powershell;

pub fn command() -> Command {
    Command::new("validate")
        .about("Check a PowerShell command for compliance and safety without running it")
        .arg(
            Arg::new("command")
                .short('c')
                .long("command")
                .help("Command to validate")
                .required(true),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Validate at the high safety level")
                .action(ArgAction::SetTrue),
        )
}

pub fn run(matches: &ArgMatches, settings: &Settings) -> CmdExit {
    let command = matches
        .get_one::<String>("command")
        .map_or("", String::as_str);

    let compliance = powershell::validate(command);
    let safety = CommandValidator::new(settings.safety_level)
        .validate(&compliance.corrected, matches.get_flag("strict"));

    println!("{}", ui::render_validation(&compliance, &safety));

    if compliance.is_valid && safety.is_safe {
        CmdExit::ok()
    } else {
        CmdExit {
            code: exitcode::DATAERR,
            message: None,
        }
    }
}
