use crate::input::{is_valid_year, normalize_country, normalize_sport};
use crate::olympics;
use crate::result::QueryResult;
use crate::walker::Walker;
use podium_scanner::{DocumentSource, Result, ScanError};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MedalColour {
    Gold,
    Silver,
    Bronze,
}

impl MedalColour {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gold" => Some(MedalColour::Gold),
            "silver" => Some(MedalColour::Silver),
            "bronze" => Some(MedalColour::Bronze),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MedalColour::Gold => "gold",
            MedalColour::Silver => "silver",
            MedalColour::Bronze => "bronze",
        }
    }

    /// Position of this colour's column counted from the end of a medal
    /// table row (the last column is the total).
    pub fn column_from_end(self) -> usize {
        match self {
            MedalColour::Gold => 4,
            MedalColour::Silver => 3,
            MedalColour::Bronze => 2,
        }
    }
}

/// One question the tool can answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum Query {
    SportsStartingWith { prefix: String },
    ObsoleteNations,
    MedalNations { threshold: i64, colour: MedalColour, year: String },
    PodiumSweeps { year: String },
    TotalMedals { country: String, sport: String },
    Headquartered { country: String },
    TorchRelay { country: String, since: String },
    FlagBearer { country: String, year: String },
    FlagSources { year: String },
}

impl Query {
    pub fn name(&self) -> &'static str {
        match self {
            Query::SportsStartingWith { .. } => "sports",
            Query::ObsoleteNations => "obsolete",
            Query::MedalNations { .. } => "medals",
            Query::PodiumSweeps { .. } => "sweeps",
            Query::TotalMedals { .. } => "total",
            Query::Headquartered { .. } => "headquarters",
            Query::TorchRelay { .. } => "torch",
            Query::FlagBearer { .. } => "flag-bearer",
            Query::FlagSources { .. } => "flags",
        }
    }

    /// The question, phrased for a report heading.
    pub fn describe(&self) -> String {
        match self {
            Query::SportsStartingWith { prefix } => {
                format!("Olympic sports starting with '{}'", prefix)
            }
            Query::ObsoleteNations => "Nations that competed but no longer exist".to_string(),
            Query::MedalNations { threshold, colour, year } => format!(
                "Nations with at least {} {} medals in {}",
                threshold,
                colour.as_str(),
                year
            ),
            Query::PodiumSweeps { year } => format!("Nations with podium sweeps in {}", year),
            Query::TotalMedals { country, sport } => {
                format!("Total medals won by {} in {}", country, sport)
            }
            Query::Headquartered { country } => {
                format!("Governing bodies headquartered in {}", country)
            }
            Query::TorchRelay { country, since } => format!(
                "Countries crossed by the longest torch relay in {} since {}",
                country, since
            ),
            Query::FlagBearer { country, year } => {
                format!("Are the {} flag bearers of {} still alive?", year, country)
            }
            Query::FlagSources { year } => format!("Flags of the nations at the {} Games", year),
        }
    }

    /// Apply the capitalisation page text uses: countries on every word,
    /// sports on the first word only. Years and prefixes are trimmed.
    pub fn normalized(self) -> Self {
        match self {
            Query::SportsStartingWith { prefix } => Query::SportsStartingWith {
                prefix: prefix.trim().to_string(),
            },
            Query::ObsoleteNations => Query::ObsoleteNations,
            Query::MedalNations { threshold, colour, year } => Query::MedalNations {
                threshold,
                colour,
                year: year.trim().to_string(),
            },
            Query::PodiumSweeps { year } => Query::PodiumSweeps {
                year: year.trim().to_string(),
            },
            Query::TotalMedals { country, sport } => Query::TotalMedals {
                country: normalize_country(&country),
                sport: normalize_sport(&sport),
            },
            Query::Headquartered { country } => Query::Headquartered {
                country: country.trim().to_string(),
            },
            Query::TorchRelay { country, since } => Query::TorchRelay {
                country: normalize_country(&country),
                since: since.trim().to_string(),
            },
            Query::FlagBearer { country, year } => Query::FlagBearer {
                country: country.trim().to_string(),
                year: year.trim().to_string(),
            },
            Query::FlagSources { year } => Query::FlagSources {
                year: year.trim().to_string(),
            },
        }
    }

    /// The edition year this query is about, if any.
    pub fn year(&self) -> Option<&str> {
        match self {
            Query::MedalNations { year, .. }
            | Query::PodiumSweeps { year }
            | Query::FlagBearer { year, .. }
            | Query::FlagSources { year } => Some(year),
            _ => None,
        }
    }

    pub async fn run<S: DocumentSource>(&self, walker: &Walker<S>) -> Result<QueryResult> {
        if let Some(year) = self.year()
            && !is_valid_year(year)
        {
            return Err(ScanError::InvalidYear(year.to_string()));
        }

        info!("Running {} query: {}", self.name(), self.describe());
        let start = Instant::now();

        let result = match self {
            Query::SportsStartingWith { prefix } => {
                QueryResult::Names(olympics::sports_starting_with(walker, prefix).await)
            }
            Query::ObsoleteNations => QueryResult::Names(olympics::obsolete_nations(walker).await),
            Query::MedalNations { threshold, colour, year } => QueryResult::Names(
                olympics::medal_nations(walker, *threshold, *colour, year).await?,
            ),
            Query::PodiumSweeps { year } => {
                QueryResult::Names(olympics::podium_sweeps(walker, year).await)
            }
            Query::TotalMedals { country, sport } => {
                QueryResult::Count(olympics::total_medals(walker, country, sport).await?)
            }
            Query::Headquartered { country } => {
                QueryResult::Count(olympics::headquartered(walker, country).await as i64)
            }
            Query::TorchRelay { country, since } => {
                QueryResult::Count(olympics::torch_relay(walker, country, since).await? as i64)
            }
            Query::FlagBearer { country, year } => {
                QueryResult::Status(olympics::flag_bearer(walker, country, year).await)
            }
            Query::FlagSources { year } => QueryResult::Urls(olympics::flag_sources(walker, year).await),
        };

        info!(
            "{} query finished in {:?} with {} result(s)",
            self.name(),
            start.elapsed(),
            result.len()
        );
        Ok(result)
    }
}
