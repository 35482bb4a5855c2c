// Tests for argument handling and the interactive menu

use podium::commands::command_argument_builder;
use podium::handlers::*;
use podium::menu::{FAREWELL, INVALID_CHOICE, Menu};
use podium_core::report::ReportFormat;
use podium_core::{MedalColour, Query, Walker};
use podium_scanner::{CacheScope, CachedSource, HttpSource, MemorySource, SourceConfig};
use tempfile::TempDir;
use tracing::Level;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "http://wiki.test";

// ============================================================================
// Logging
// ============================================================================

#[test]
fn test_log_level_by_verbosity() {
    assert_eq!(log_level(0), Level::WARN);
    assert_eq!(log_level(1), Level::INFO);
    assert_eq!(log_level(2), Level::DEBUG);
    assert_eq!(log_level(7), Level::DEBUG);
}

#[test]
fn test_init_logging_twice_keeps_first_subscriber() {
    init_logging(1);
    init_logging(2);
    tracing::info!("still logging");
}

// ============================================================================
// Command line
// ============================================================================

#[test]
fn test_year_arguments_are_validated() {
    let cmd = command_argument_builder;

    assert!(cmd().try_get_matches_from(["podium", "sweeps", "2012"]).is_ok());
    assert!(cmd().try_get_matches_from(["podium", "sweeps", "1700"]).is_err());
    assert!(cmd().try_get_matches_from(["podium", "sweeps", "twelve"]).is_err());
    assert!(cmd().try_get_matches_from(["podium", "collage", "9999"]).is_err());
}

#[test]
fn test_medal_colour_must_be_known() {
    let result =
        command_argument_builder().try_get_matches_from(["podium", "medals", "3", "platinum", "2012"]);
    assert!(result.is_err());
}

#[test]
fn test_query_from_args_normalises_names() {
    let matches = command_argument_builder()
        .try_get_matches_from(["podium", "total", "great britain", "modern pentathlon"])
        .unwrap();
    let (name, sub) = matches.subcommand().unwrap();

    let query = query_from_args(name, sub).unwrap();

    assert_eq!(
        query,
        Query::TotalMedals {
            country: "Great Britain".to_string(),
            sport: "Modern pentathlon".to_string(),
        }
    );
}

#[test]
fn test_query_from_args_medals() {
    let matches = command_argument_builder()
        .try_get_matches_from(["podium", "medals", "5", "silver", "2012"])
        .unwrap();
    let (name, sub) = matches.subcommand().unwrap();

    let query = query_from_args(name, sub).unwrap();

    assert_eq!(
        query,
        Query::MedalNations {
            threshold: 5,
            colour: MedalColour::Silver,
            year: "2012".to_string(),
        }
    );
}

#[test]
fn test_query_from_args_unknown_command() {
    let matches = command_argument_builder()
        .try_get_matches_from(["podium", "obsolete"])
        .unwrap();
    assert!(query_from_args("podcast", &matches).is_err());
}

#[test]
fn test_source_config_defaults() {
    let matches = command_argument_builder()
        .try_get_matches_from(["podium", "obsolete"])
        .unwrap();
    let (_, sub) = matches.subcommand().unwrap();

    let config = source_config_from_args(sub).unwrap();

    assert_eq!(config.base_url.as_str(), "https://en.wikipedia.org/");
    assert_eq!(config.root, "/wiki/Summer_Olympic_Games");
    assert_eq!(config.workers, 8);
    assert_eq!(config.timeout_secs, 20);
    assert_eq!(config.cache, CacheScope::Session);
    assert_eq!(report_format_from_args(sub), ReportFormat::Text);
}

#[test]
fn test_source_config_from_global_flags() {
    let matches = command_argument_builder()
        .try_get_matches_from([
            "podium",
            "--base-url",
            "http://localhost:8080",
            "-t",
            "3",
            "--cache",
            "query",
            "sports",
            "b",
            "--format",
            "json",
        ])
        .unwrap();
    let (_, sub) = matches.subcommand().unwrap();

    let config = source_config_from_args(sub).unwrap();

    assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
    assert_eq!(config.workers, 3);
    assert_eq!(config.cache, CacheScope::Query);
    assert_eq!(report_format_from_args(sub), ReportFormat::Json);
}

#[test]
fn test_collage_options_expand_home() {
    let options = CollageOptions::new("~/flags", 20);
    assert!(!options.dir.to_string_lossy().starts_with('~'));
    assert_eq!(options.flag_size, 20);
}

const ROOT: &str = r#"<html><body>
    <table class="wikitable sortable">
      <tr><th>Sport</th></tr>
      <tr><td><a href="/wiki/Boxing">Boxing</a></td></tr>
      <tr><td><a href="/wiki/Judo">Judo</a></td></tr>
      <tr><td><a href="/wiki/Basketball">Basketball</a></td></tr>
    </table>
</body></html>"#;

// ============================================================================
// Report output
// ============================================================================

#[tokio::test]
async fn test_handle_query_saves_json_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/Summer_Olympic_Games"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ROOT, "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let config = SourceConfig::new(&server.uri()).unwrap().with_timeout(5);
    let session =
        Session::<HttpSource>::http(config, ReportFormat::Json, CollageOptions::default()).unwrap();
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("sports.json");
    let query = Query::SportsStartingWith { prefix: "b".to_string() };

    handle_query(&session, &query, Some(output.as_path())).await.unwrap();

    let saved = std::fs::read_to_string(&output).unwrap();
    let json: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(json["report"]["metadata"]["format"], "json");
    let content = json["report"].to_string();
    assert!(content.contains("basketball"));
    assert!(content.contains("boxing"));
    assert!(!content.contains("judo"));
}

#[tokio::test]
async fn test_handle_query_reports_unwritable_output() {
    let session = session();
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("missing").join("report.txt");
    let query = Query::SportsStartingWith { prefix: "b".to_string() };

    let result = handle_query(&session, &query, Some(output.as_path())).await;

    assert!(result.unwrap_err().starts_with("Failed to write"));
}

// ============================================================================
// Menu
// ============================================================================

fn session() -> Session<MemorySource> {
    let source = MemorySource::new().with_page(format!("{}/wiki/Summer_Olympic_Games", BASE), ROOT);
    let config = SourceConfig::new(BASE).unwrap();

    Session::new(
        Walker::new(CachedSource::new(source), config),
        ReportFormat::Text,
        reqwest::Client::new(),
        CollageOptions::default(),
    )
}

async fn play(input: &str) -> String {
    let session = session();
    let mut menu = Menu::new(input.as_bytes(), Vec::new());
    menu.run(&session).await.unwrap();
    String::from_utf8(menu.into_output()).unwrap()
}

#[tokio::test]
async fn test_menu_answers_a_question() {
    let out = play("1\nb\n000\n").await;

    assert!(out.contains("Enter the starting letter(s): "));
    assert!(out.contains("• basketball"));
    assert!(out.contains("• boxing"));
    assert!(!out.contains("• judo"));
    assert!(out.contains(FAREWELL));
}

#[tokio::test]
async fn test_menu_rejects_unknown_choice() {
    let out = play("9\n000\n").await;

    assert!(out.contains(INVALID_CHOICE));
    assert!(out.contains("Next question... "));
    assert!(out.contains(FAREWELL));
}

#[tokio::test]
async fn test_menu_rejects_bad_year_without_fetching() {
    let session = session();
    let mut menu = Menu::new("4\nnineteen\n000\n".as_bytes(), Vec::new());
    menu.run(&session).await.unwrap();
    let out = String::from_utf8(menu.into_output()).unwrap();

    assert!(out.contains("'nineteen' is not a valid year"));
    assert_eq!(session.walker.source().inner().fetch_count(), 0);
}

#[tokio::test]
async fn test_menu_stops_at_end_of_input() {
    let out = play("1\n").await;

    assert!(out.contains("Enter the starting letter(s): "));
    assert!(!out.contains(FAREWELL));
}

#[tokio::test]
async fn test_menu_repeats_instructions() {
    let out = play("0\n000\n").await;
    assert_eq!(out.matches("Type 000 to exit the program.").count(), 2);
}
