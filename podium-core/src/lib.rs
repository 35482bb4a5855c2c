use colored::Colorize;

pub mod artifacts;
pub mod input;
pub mod olympics;
pub mod query;
pub mod report;
pub mod result;
pub mod walker;

pub use query::{MedalColour, Query};
pub use result::QueryResult;
pub use walker::{HttpWalker, Walker};

const BANNER: &str = r#"
                  _ _
  _ __   ___   __| (_)_   _ _ __ ___
 | '_ \ / _ \ / _` | | | | | '_ ` _ \
 | |_) | (_) | (_| | | |_| | | | | | |
 | .__/ \___/ \__,_|_|\__,_|_| |_| |_|
 |_|
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_yellow().bold());
    println!(
        "  {} {}\n",
        "Olympic trivia from the encyclopedia".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
