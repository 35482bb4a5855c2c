use anyhow::bail;
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use podium_core::artifacts::{
    DEFAULT_FLAG_SIZE, compose_collage, download_flags, write_medal_csv, write_pixel_csv,
};
use podium_core::input::is_valid_year;
use podium_core::olympics::{flag_sources, medal_rows};
use podium_core::report::{ReportFormat, generate_report, save_report};
use podium_core::{HttpWalker, MedalColour, Query, Walker};
use podium_scanner::config::DEFAULT_BASE_URL;
use podium_scanner::{CacheScope, CachedSource, DocumentSource, HttpSource, ScanError, SourceConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use url::Url;

pub const DEFAULT_COLLAGE_DIR: &str = "./flags";

// Logging

/// WARN by default, INFO with `-v`, DEBUG with `-vv` or more.
pub fn log_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// Install the stderr subscriber. A second call keeps the first subscriber.
pub fn init_logging(verbosity: u8) {
    let installed = tracing_subscriber::fmt()
        .with_max_level(log_level(verbosity))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    if installed.is_err() {
        tracing::debug!("A tracing subscriber is already installed");
    }
}

// Argument helpers

/// Build the source configuration from the global flags.
pub fn source_config_from_args(args: &ArgMatches) -> Result<SourceConfig, String> {
    let base_url = args
        .get_one::<Url>("base-url")
        .map(Url::as_str)
        .unwrap_or(DEFAULT_BASE_URL);
    let mut config = SourceConfig::new(base_url).map_err(|e| e.to_string())?;

    if let Some(root) = args.get_one::<String>("root") {
        config = config.with_root(root.clone());
    }
    if let Some(timeout) = args.get_one::<u64>("timeout") {
        config = config.with_timeout(*timeout);
    }
    if let Some(workers) = args.get_one::<usize>("workers") {
        config = config.with_workers(*workers);
    }
    if let Some(cache) = args.get_one::<String>("cache") {
        let scope =
            CacheScope::from_str(cache).ok_or_else(|| format!("Unknown cache scope '{}'", cache))?;
        config = config.with_cache(scope);
    }

    Ok(config)
}

pub fn report_format_from_args(args: &ArgMatches) -> ReportFormat {
    args.get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text)
}

/// Turn a query subcommand into a [`Query`], normalising what was typed.
pub fn query_from_args(name: &str, args: &ArgMatches) -> Result<Query, String> {
    let text = |id: &str| {
        args.get_one::<String>(id)
            .cloned()
            .ok_or_else(|| format!("Missing <{}>", id))
    };

    let query = match name {
        "sports" => Query::SportsStartingWith {
            prefix: text("PREFIX")?,
        },
        "obsolete" => Query::ObsoleteNations,
        "medals" => {
            let colour = text("COLOUR")?;
            Query::MedalNations {
                threshold: *args
                    .get_one::<i64>("THRESHOLD")
                    .ok_or("Missing <THRESHOLD>")?,
                colour: MedalColour::from_str(&colour)
                    .ok_or_else(|| format!("Unknown medal colour '{}'", colour))?,
                year: text("YEAR")?,
            }
        }
        "sweeps" => Query::PodiumSweeps { year: text("YEAR")? },
        "total" => Query::TotalMedals {
            country: text("COUNTRY")?,
            sport: text("SPORT")?,
        },
        "headquarters" => Query::Headquartered {
            country: text("COUNTRY")?,
        },
        "torch" => Query::TorchRelay {
            country: text("COUNTRY")?,
            since: text("SINCE")?,
        },
        "flag-bearer" => Query::FlagBearer {
            country: text("COUNTRY")?,
            year: text("YEAR")?,
        },
        other => return Err(format!("Unknown command '{}'", other)),
    };

    Ok(query.normalized())
}

// Output

pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.into());
    spinner
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

// Session

pub struct CollageOptions {
    pub dir: PathBuf,
    pub flag_size: u32,
}

impl Default for CollageOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_COLLAGE_DIR),
            flag_size: DEFAULT_FLAG_SIZE,
        }
    }
}

impl CollageOptions {
    /// Options for a user-supplied directory; `~` is expanded.
    pub fn new(dir: &str, flag_size: u32) -> Self {
        Self {
            dir: PathBuf::from(shellexpand::tilde(dir).as_ref()),
            flag_size,
        }
    }
}

#[derive(Debug)]
pub struct CollageSummary {
    pub dir: PathBuf,
    pub flags: usize,
    pub collage: PathBuf,
}

/// Everything one run of the tool shares between questions.
pub struct Session<S> {
    pub walker: Walker<CachedSource<S>>,
    pub format: ReportFormat,
    pub client: reqwest::Client,
    pub collage: CollageOptions,
}

impl Session<HttpSource> {
    pub fn http(
        config: SourceConfig,
        format: ReportFormat,
        collage: CollageOptions,
    ) -> Result<Self, String> {
        let client = flag_client(&config).map_err(|e| e.to_string())?;
        let walker = HttpWalker::http(config).map_err(|e| e.to_string())?;
        Ok(Self {
            walker,
            format,
            client,
            collage,
        })
    }
}

/// Client for downloading flag images, with the same manners as page fetches.
pub fn flag_client(config: &SourceConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
}

impl<S: DocumentSource> Session<S> {
    pub fn new(
        walker: Walker<CachedSource<S>>,
        format: ReportFormat,
        client: reqwest::Client,
        collage: CollageOptions,
    ) -> Self {
        Self {
            walker,
            format,
            client,
            collage,
        }
    }

    /// Run `query` behind a spinner and render its report.
    pub async fn answer(&self, query: &Query) -> Result<String, String> {
        let spinner = spinner(format!("{}...", query.describe()));
        let result = query.run(&self.walker).await;
        self.walker.end_query().await;
        spinner.finish_and_clear();

        let result = result.map_err(|e| e.to_string())?;
        generate_report(self.format, query, &result).map_err(|e| e.to_string())
    }

    /// Download the flags of `year`'s nations and build every artifact from
    /// them in `<dir>/<year>`.
    pub async fn collage(&self, year: &str) -> anyhow::Result<CollageSummary> {
        if !is_valid_year(year) {
            return Err(ScanError::InvalidYear(year.to_string()).into());
        }

        let spinner = spinner(format!("Collecting flags for {}...", year));
        let outcome = self.build_collage(year, &spinner).await;
        self.walker.end_query().await;
        spinner.finish_and_clear();
        outcome
    }

    async fn build_collage(&self, year: &str, spinner: &ProgressBar) -> anyhow::Result<CollageSummary> {
        let urls = flag_sources(&self.walker, year).await;
        if urls.is_empty() {
            bail!("No flags found for {}", year);
        }
        let medals = medal_rows(&self.walker, year).await;

        let dir = self.collage.dir.join(year);
        spinner.set_message(format!("Downloading {} flags. This might take a while...", urls.len()));
        let flags = download_flags(&self.client, &urls, &dir, self.walker.config().workers).await?;

        spinner.set_message("Writing cheat sheet and medal lookup...");
        write_pixel_csv(&dir)?;
        write_medal_csv(&medals, &dir)?;

        spinner.set_message("Composing collage...");
        let collage = compose_collage(&dir, self.collage.flag_size)?;

        Ok(CollageSummary {
            dir,
            flags,
            collage,
        })
    }
}

// Handlers

pub async fn handle_query<S: DocumentSource>(
    session: &Session<S>,
    query: &Query,
    output: Option<&Path>,
) -> Result<(), String> {
    let report = session.answer(query).await?;

    match output {
        Some(path) => {
            save_report(&report, path)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            print_success(&format!("Report saved to {}", path.display()));
        }
        None => print!("{}", report),
    }

    Ok(())
}

pub async fn handle_collage<S: DocumentSource>(session: &Session<S>, year: &str) -> Result<(), String> {
    let summary = session.collage(year).await.map_err(|e| format!("{:#}", e))?;

    print_success(&format!("{} flags downloaded to {}", summary.flags, summary.dir.display()));
    print_success(&format!("Collage saved to {}", summary.collage.display()));
    Ok(())
}
