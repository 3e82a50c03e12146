pub mod logging;

use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};
use regex::Regex;

pub const ARG_API_URL: &str = "api-url";
pub const ARG_DATA_DIR: &str = "data-dir";
pub const ARG_TIMEOUT: &str = "timeout";

#[must_use]
pub fn validator_email() -> ValueParser {
    ValueParser::from(move |email: &str| -> std::result::Result<String, String> {
        let valid =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email));
        if valid {
            Ok(email.to_string())
        } else {
            Err("invalid email address".to_string())
        }
    })
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("opoadmin")
        .about("Admin console for the opoadmin exam-prep platform")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg(
            Arg::new(ARG_API_URL)
                .short('u')
                .long("api-url")
                .help("Base URL of the backend API, example: https://api.opoadmin.dev/api")
                .env("OPOADMIN_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_DATA_DIR)
                .long("data-dir")
                .help("Directory for the local session store (default: platform config dir)")
                .env("OPOADMIN_DATA_DIR")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .short('t')
                .long("timeout")
                .help("Request timeout in seconds")
                .default_value("10")
                .env("OPOADMIN_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .subcommand(
            Command::new("login")
                .about("Log in and store the session")
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .help("Admin email")
                        .env("OPOADMIN_EMAIL")
                        .required(true)
                        .value_parser(validator_email()),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Admin password (read from stdin when omitted)")
                        .env("OPOADMIN_PASSWORD"),
                ),
        )
        .subcommand(Command::new("logout").about("Clear the stored session"))
        .subcommand(Command::new("whoami").about("Show the authenticated admin user"))
        .subcommand(
            Command::new("update")
                .about("Update the admin profile")
                .arg(Arg::new("name").long("name").help("New display name"))
                .arg(
                    Arg::new("email")
                        .long("email")
                        .help("New email address")
                        .value_parser(validator_email()),
                ),
        )
        .subcommand(
            Command::new("passwd")
                .about("Change the admin password")
                .arg(
                    Arg::new("current-password")
                        .long("current-password")
                        .help("Current password")
                        .env("OPOADMIN_CURRENT_PASSWORD")
                        .required(true),
                )
                .arg(
                    Arg::new("new-password")
                        .long("new-password")
                        .help("New password")
                        .env("OPOADMIN_NEW_PASSWORD")
                        .required(true),
                ),
        )
        .subcommand(Command::new("stats").about("Show user and system statistics"))
        .subcommand(
            Command::new("area")
                .about("Show or change the selected operating area")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Show the current area"))
                .subcommand(
                    Command::new("set").about("Select an area").arg(
                        Arg::new("id")
                            .help("Area id (1 = PN, 2 = PS)")
                            .required(true)
                            .action(ArgAction::Set),
                    ),
                )
                .subcommand(Command::new("history").about("Show past area selections")),
        );

    logging::with_args(command)
}
