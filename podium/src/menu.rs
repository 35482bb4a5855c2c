//! The numbered question menu.
//!
//! Reads choices and parameters line by line from any [`BufRead`] and writes
//! to any [`Write`], so a session can be replayed from a script. End of input
//! ends the session like `000` does, without the farewell.

use crate::handlers::Session;
use colored::Colorize;
use podium_core::input::is_valid_year;
use podium_core::{MedalColour, Query};
use podium_scanner::DocumentSource;
use std::io::{self, BufRead, Write};

pub const INSTRUCTIONS: &str = "\
Welcome to Podium!
We have scraped Olympics data. You cannot trick us with absurd inputs. You can:

0: Type 0 to repeat the instructions.
000: Type 000 to exit the program.
1. Type 1 to list all past and present Olympic sports that start with the letter {inp: letter}.
2. Type 2 to see all countries that have participated in the Olympics, but are now considered \"obsolete\".
3. Type 3 to list all countries that have won at least {inp: number} {inp: medal colour} medals in {inp: year}.
4. Type 4 to list all countries that had podium sweeps in {inp: year}.
5. Type 5 to list how many total medals {inp: country} has won in {inp: sport}.
6. Type 6 to see how many governing bodies of the past or present sports from the Summer Olympics
   are headquartered in {inp: country}.
7. Type 7 to answer the question: among all Summer Olympics hosted in {inp: country} since {inp: year},
   how many countries did the torch relay that covered the longest total distance pass through?
8. Type 8 to find out if the flag bearer of {inp: country} from {inp: year} is still alive.
10. Type 10 to generate a collage of all countries that participated in the Summer Olympics of {inp: year}.
";

pub const FAREWELL: &str = "Thanks for exploring our data!";
pub const NEXT: &str = "Next question... ";
pub const INVALID_CHOICE: &str = "Invalid input. Please enter 0, 000, a number between 1 and 8, or 10.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Instructions,
    Exit,
    Sports,
    Obsolete,
    Medals,
    Sweeps,
    Total,
    Headquarters,
    Torch,
    FlagBearer,
    Collage,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "0" => Some(MenuChoice::Instructions),
            "000" => Some(MenuChoice::Exit),
            "1" => Some(MenuChoice::Sports),
            "2" => Some(MenuChoice::Obsolete),
            "3" => Some(MenuChoice::Medals),
            "4" => Some(MenuChoice::Sweeps),
            "5" => Some(MenuChoice::Total),
            "6" => Some(MenuChoice::Headquarters),
            "7" => Some(MenuChoice::Torch),
            "8" => Some(MenuChoice::FlagBearer),
            "10" => Some(MenuChoice::Collage),
            _ => None,
        }
    }

    fn question(self) -> &'static str {
        match self {
            MenuChoice::Sports => "List all past and present Olympic sports that start with the letter {inp: letter}",
            MenuChoice::Obsolete => {
                "See all countries that have participated in the Olympics, but are now considered \"obsolete\""
            }
            MenuChoice::Medals => {
                "List all countries that have won at least {inp: number} {inp: medal colour} medals in {inp: year}"
            }
            MenuChoice::Sweeps => "List all countries that had podium sweeps in {inp: year}",
            MenuChoice::Total => "How many total medals {inp: country} has won in {inp: sport}",
            MenuChoice::Headquarters => {
                "How many governing bodies of the past or present Summer Olympic sports are headquartered in {inp: country}"
            }
            MenuChoice::Torch => {
                "Among all Summer Olympics hosted in {inp: country} since {inp: year}, how many countries did the \
                 torch relay that covered the longest total distance pass through?"
            }
            MenuChoice::FlagBearer => "Find out if the flag bearer of {inp: country} from {inp: year} is still alive",
            MenuChoice::Collage => {
                "Generate a collage of all countries that participated in the Summer Olympics of {inp: year}"
            }
            MenuChoice::Instructions | MenuChoice::Exit => "",
        }
    }
}

pub struct Menu<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)
    }

    fn error(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{} {}", "✗".red().bold(), text.red())
    }

    /// The next trimmed line, or `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.out, "{}", prompt.bright_cyan().bold())?;
        self.out.flush()?;
        self.read_line()
    }

    /// Ask until the answer parses as a whole number.
    fn ask_number(&mut self, prompt: &str) -> io::Result<Option<i64>> {
        let mut answer = self.ask(prompt)?;
        while let Some(text) = answer {
            if let Ok(n) = text.parse() {
                return Ok(Some(n));
            }
            self.say("Please enter a valid number!")?;
            answer = self.read_line()?;
        }
        Ok(None)
    }

    fn ask_colour(&mut self, prompt: &str) -> io::Result<Option<MedalColour>> {
        let mut answer = self.ask(prompt)?;
        while let Some(text) = answer {
            if let Some(colour) = MedalColour::from_str(&text) {
                return Ok(Some(colour));
            }
            self.say("Please enter gold, silver or bronze!")?;
            answer = self.read_line()?;
        }
        Ok(None)
    }

    /// Prompt for the parameters of `choice`. `None` at end of input or for
    /// choices that are not queries.
    pub fn read_query(&mut self, choice: MenuChoice) -> io::Result<Option<Query>> {
        let query = match choice {
            MenuChoice::Sports => {
                let Some(prefix) = self.ask("Enter the starting letter(s): ")? else {
                    return Ok(None);
                };
                Query::SportsStartingWith { prefix }
            }
            MenuChoice::Obsolete => Query::ObsoleteNations,
            MenuChoice::Medals => {
                let Some(threshold) = self.ask_number("Enter the minimum number of medals: ")? else {
                    return Ok(None);
                };
                let Some(colour) = self.ask_colour("Enter the colour of medals (gold, silver, or bronze): ")? else {
                    return Ok(None);
                };
                let Some(year) = self.ask("Enter the year: ")? else {
                    return Ok(None);
                };
                Query::MedalNations { threshold, colour, year }
            }
            MenuChoice::Sweeps => {
                let Some(year) = self.ask("Enter the year: ")? else {
                    return Ok(None);
                };
                Query::PodiumSweeps { year }
            }
            MenuChoice::Total => {
                let Some(country) = self.ask("Enter country: ")? else {
                    return Ok(None);
                };
                let Some(sport) = self.ask("Enter sport: ")? else {
                    return Ok(None);
                };
                Query::TotalMedals { country, sport }
            }
            MenuChoice::Headquarters => {
                let Some(country) = self.ask("Enter country: ")? else {
                    return Ok(None);
                };
                Query::Headquartered { country }
            }
            MenuChoice::Torch => {
                let Some(country) = self.ask("Enter host country: ")? else {
                    return Ok(None);
                };
                let Some(since) = self.ask("Enter starting year: ")? else {
                    return Ok(None);
                };
                Query::TorchRelay { country, since }
            }
            MenuChoice::FlagBearer => {
                let Some(country) = self.ask("Enter country: ")? else {
                    return Ok(None);
                };
                let Some(year) = self.ask("Enter year: ")? else {
                    return Ok(None);
                };
                Query::FlagBearer { country, year }
            }
            MenuChoice::Instructions | MenuChoice::Exit | MenuChoice::Collage => return Ok(None),
        };

        Ok(Some(query.normalized()))
    }

    pub async fn run<S: DocumentSource>(&mut self, session: &Session<S>) -> io::Result<()> {
        self.say(INSTRUCTIONS)?;

        while let Some(line) = self.read_line()? {
            let Some(choice) = MenuChoice::parse(&line) else {
                self.error(INVALID_CHOICE)?;
                self.say(NEXT)?;
                continue;
            };

            match choice {
                MenuChoice::Instructions => self.say(INSTRUCTIONS)?,
                MenuChoice::Exit => {
                    self.say(FAREWELL)?;
                    return Ok(());
                }
                MenuChoice::Collage => {
                    self.say(&format!("\n{}\n", choice.question()))?;
                    let Some(year) = self.ask("Enter year: ")? else {
                        break;
                    };
                    match session.collage(&year).await {
                        Ok(summary) => {
                            self.say(&format!(
                                "{} {} flags downloaded to {}",
                                "✓".green().bold(),
                                summary.flags,
                                summary.dir.display()
                            ))?;
                            self.say(&format!(
                                "{} Collage saved to {}",
                                "✓".green().bold(),
                                summary.collage.display()
                            ))?;
                        }
                        Err(e) => self.error(&format!("{:#}", e))?,
                    }
                }
                _ => {
                    self.say(&format!("\n{}\n", choice.question()))?;
                    let Some(query) = self.read_query(choice)? else {
                        break;
                    };
                    if let Some(year) = query.year()
                        && !is_valid_year(year)
                    {
                        self.error(&format!("'{}' is not a valid year", year))?;
                    } else {
                        match session.answer(&query).await {
                            Ok(report) => write!(self.out, "{}", report)?,
                            Err(e) => self.error(&e)?,
                        }
                    }
                }
            }

            self.say(NEXT)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choices() {
        assert_eq!(MenuChoice::parse(" 0 "), Some(MenuChoice::Instructions));
        assert_eq!(MenuChoice::parse("000"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("8"), Some(MenuChoice::FlagBearer));
        assert_eq!(MenuChoice::parse("10"), Some(MenuChoice::Collage));
        assert_eq!(MenuChoice::parse("9"), None);
        assert_eq!(MenuChoice::parse("00"), None);
        assert_eq!(MenuChoice::parse("one"), None);
    }

    #[test]
    fn test_read_query_reprompts_threshold() {
        let input = "lots\n3\ngold\n2012\n";
        let mut menu = Menu::new(input.as_bytes(), Vec::new());

        let query = menu.read_query(MenuChoice::Medals).unwrap();

        assert_eq!(
            query,
            Some(Query::MedalNations {
                threshold: 3,
                colour: MedalColour::Gold,
                year: "2012".to_string(),
            })
        );
        let out = String::from_utf8(menu.into_output()).unwrap();
        assert_eq!(out.matches("Please enter a valid number!").count(), 1);
    }

    #[test]
    fn test_read_query_normalises_names() {
        let input = "great britain\nmodern pentathlon\n";
        let mut menu = Menu::new(input.as_bytes(), Vec::new());

        let query = menu.read_query(MenuChoice::Total).unwrap();

        assert_eq!(
            query,
            Some(Query::TotalMedals {
                country: "Great Britain".to_string(),
                sport: "Modern pentathlon".to_string(),
            })
        );
    }

    #[test]
    fn test_read_query_at_end_of_input() {
        let mut menu = Menu::new("France\n".as_bytes(), Vec::new());
        assert_eq!(menu.read_query(MenuChoice::FlagBearer).unwrap(), None);
    }
}
