// Report generation from query results

use crate::query::Query;
use crate::result::QueryResult;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const NOTHING_FOUND: &str = "Nothing found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// The one-line (or one-list) answer to `query`, as the menu prints it.
pub fn answer_text(query: &Query, result: &QueryResult) -> String {
    match (query, result) {
        (Query::TotalMedals { country, sport }, QueryResult::Count(n)) => {
            format!("{} has {} total medals in {}", country, n, sport)
        }
        (Query::Headquartered { country }, QueryResult::Count(n)) => {
            format!("{} governing bodies are headquartered in {}", n, country)
        }
        (Query::TorchRelay { country, since }, QueryResult::Count(0)) => {
            format!("No torch relay data for {} since {}.", country, since)
        }
        (Query::TorchRelay { country, since }, QueryResult::Count(n)) => {
            format!("Longest torch relay in {} since {} was {} countries.", country, since, n)
        }
        (_, result) if result.is_empty() => NOTHING_FOUND.to_string(),
        (_, QueryResult::Count(n)) => n.to_string(),
        (_, QueryResult::Names(names)) => names.iter().cloned().collect::<Vec<_>>().join("\n"),
        (_, QueryResult::Status(status)) => status.trim().to_string(),
        (_, QueryResult::Urls(urls)) => urls.join("\n"),
    }
}

pub fn generate_text_report(query: &Query, result: &QueryResult) -> String {
    let mut report = String::new();

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str(&format!("{}\n", query.describe()));
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    match result {
        QueryResult::Names(names) if !names.is_empty() => {
            for name in names {
                report.push_str(&format!("  • {}\n", name));
            }
            report.push_str(&format!("\nTotal: {}\n", names.len()));
        }
        QueryResult::Urls(urls) if !urls.is_empty() => {
            for url in urls {
                report.push_str(&format!("  {}\n", url));
            }
            report.push_str(&format!("\nTotal: {}\n", urls.len()));
        }
        _ => {
            report.push_str(&answer_text(query, result));
            report.push('\n');
        }
    }

    report
}

pub fn generate_json_report(query: &Query, result: &QueryResult) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Podium",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "question": query.describe(),
            "query": query,
            "answer": answer_text(query, result),
            "result": result
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_report(
    format: ReportFormat,
    query: &Query,
    result: &QueryResult,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(query, result)),
        ReportFormat::Json => generate_json_report(query, result),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
