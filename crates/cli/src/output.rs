use crate::error::CliError;
use engine_config::settings::validated::Configuration;
use engine_core::state::models::Checkpoint;
use serde::Serialize;

/// What `check` reports about a source.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub source: String,
    pub table: String,
    pub query: String,
    pub incremental_column: Option<String>,
    pub status_file: String,
    pub initial_cursor: String,
    pub checkpoint: Option<Checkpoint>,
}

impl CheckReport {
    pub fn new(config: &Configuration, checkpoint: Option<Checkpoint>) -> Self {
        Self {
            source: config.source_name.clone(),
            table: config.table.clone(),
            query: config.query_builder().query().to_string(),
            incremental_column: config.incremental_column.clone(),
            status_file: config.status_file_path().display().to_string(),
            initial_cursor: config.initial_cursor.to_string(),
            checkpoint,
        }
    }
}

pub fn print_report(report: &CheckReport, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Source '{}':", report.source);
    println!("-----------------------------");
    println!("{:<16} {}", "Table", report.table);
    println!("{:<16} {}", "Query", report.query);
    let column = report.incremental_column.as_deref().unwrap_or("(row offset)");
    println!("{:<16} {}", "Cursor column", column);
    println!("{:<16} {}", "Status file", report.status_file);
    match &report.checkpoint {
        Some(cp) => {
            println!("{:<16} {}", "Last cursor", cp.last_value);
            println!("{:<16} {}", "Updated at", cp.updated_at.to_rfc3339());
        }
        None => println!("{:<16} {} (no checkpoint yet)", "Last cursor", report.initial_cursor),
    }
    Ok(())
}
