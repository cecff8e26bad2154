use clap::{crate_version, Arg, Command};

pub fn command() -> Command {
    Command::new("termigenius")
        .version(crate_version!())
        .about("Turn natural language into safe, native PowerShell commands")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("DIR")
                .help("Configuration folder (defaults to ~/.termigenius)")
                .global(true),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .help("Set logging level")
                .value_name("LEVEL")
                .value_parser(["off", "trace", "debug", "info", "warn", "error"])
                .default_value("info")
                .ignore_case(true)
                .global(true),
        )
}
