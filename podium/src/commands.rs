use crate::CLAP_STYLING;
use clap::{arg, command};
use podium_core::input::{EARLIEST_YEAR, is_valid_year};
use podium_scanner::config::{DEFAULT_BASE_URL, DEFAULT_ROOT};
use crate::handlers::DEFAULT_COLLAGE_DIR;
use url::Url;

fn year_arg(s: &str) -> Result<String, String> {
    let s = s.trim();
    if is_valid_year(s) {
        Ok(s.to_string())
    } else {
        Err(format!("'{}' is not a year between {} and now", s, EARLIEST_YEAR))
    }
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("podium")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("podium")
        .about("Answers Olympic trivia by walking encyclopedia pages")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false).global(true))
        .arg(
            arg!(-v --"verbose" ... "Log more (-v for progress, -vv for every fetch)")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(--"base-url" <URL>)
                .required(false)
                .help("Site that hrefs are resolved against")
                .value_parser(clap::value_parser!(Url))
                .default_value(DEFAULT_BASE_URL)
                .global(true),
        )
        .arg(
            arg!(--"root" <PATH>)
                .required(false)
                .help("Page every query starts from")
                .default_value(DEFAULT_ROOT)
                .global(true),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64))
                .default_value("20")
                .global(true),
        )
        .arg(
            arg!(-t --"workers" <NUM_WORKERS>)
                .required(false)
                .help("How many pages may be fetched at once")
                .value_parser(clap::value_parser!(usize))
                .default_value("8")
                .global(true),
        )
        .arg(
            arg!(--"cache" <SCOPE>)
                .required(false)
                .help("How long fetched pages are kept: disabled, query or session")
                .value_parser(["disabled", "query", "session"])
                .default_value("session")
                .global(true),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format: text, json")
                .value_parser(["text", "json"])
                .default_value("text")
                .global(true),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Save report to file (default: display to screen)")
                .value_parser(clap::value_parser!(std::path::PathBuf))
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(command!("menu").about("Numbered interactive menu (the default)"))
        .subcommand(
            command!("sports")
                .about("List past and present Olympic sports starting with some letters")
                .arg(arg!(<PREFIX> "Starting letter(s)")),
        )
        .subcommand(
            command!("obsolete")
                .about("List nations that competed at the Olympics but no longer exist"),
        )
        .subcommand(
            command!("medals")
                .about("List nations with at least some medals of one colour in a year")
                .arg(arg!(<THRESHOLD> "Minimum number of medals").value_parser(clap::value_parser!(i64)))
                .arg(arg!(<COLOUR> "Medal colour").value_parser(["gold", "silver", "bronze"]))
                .arg(arg!(<YEAR> "Year of the Games").value_parser(year_arg)),
        )
        .subcommand(
            command!("sweeps")
                .about("List nations that swept a podium in a year")
                .arg(arg!(<YEAR> "Year of the Games").value_parser(year_arg)),
        )
        .subcommand(
            command!("total")
                .about("Count the medals a country has won in a sport")
                .arg(arg!(<COUNTRY> "Country name"))
                .arg(arg!(<SPORT> "Sport name")),
        )
        .subcommand(
            command!("headquarters")
                .about("Count the sports' governing bodies headquartered in a country")
                .arg(arg!(<COUNTRY> "Country name")),
        )
        .subcommand(
            command!("torch")
                .about(
                    "Among Games hosted in a country since a year, how many countries the \
                longest torch relay passed through",
                )
                .arg(arg!(<COUNTRY> "Host country"))
                .arg(arg!(<SINCE> "Earliest year").value_parser(year_arg)),
        )
        .subcommand(
            command!("flag-bearer")
                .about("Find out whether a country's flag bearers of a year are still alive")
                .arg(arg!(<COUNTRY> "Country name"))
                .arg(arg!(<YEAR> "Year of the Games").value_parser(year_arg)),
        )
        .subcommand(
            command!("collage")
                .about("Download the flags of a year's nations and build a collage from them")
                .arg(arg!(<YEAR> "Year of the Games").value_parser(year_arg))
                .arg(
                    arg!(-d --"dir" <PATH>)
                        .required(false)
                        .help("Directory the flags and generated files go to")
                        .default_value(DEFAULT_COLLAGE_DIR),
                )
                .arg(
                    arg!(--"size" <PIXELS>)
                        .required(false)
                        .help("Width and height of each flag in the collage")
                        .value_parser(clap::value_parser!(u32).range(1..))
                        .default_value("50"),
                ),
        )
}
