use anyhow::Result;
use cognito_attrs_core::{MappingEntry, PlannedChange, RunSummary};
use colored::Colorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

pub fn print_summary(summary: &RunSummary, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(summary);
    }
    if summary.entries.is_empty() {
        println!("No entries processed.");
        return Ok(());
    }
    let mut builder = Builder::default();
    builder.push_record(["UserPool", "Added", "Client", "Read", "Write"]);
    for entry in &summary.entries {
        builder.push_record([
            entry.user_pool_id.clone(),
            join_or_dash(&entry.added_attributes),
            entry.client_id.clone().unwrap_or_else(|| "-".into()),
            join_or_dash(&entry.granted_read),
            join_or_dash(&entry.granted_write),
        ]);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
    println!(
        "{}: {} of {}",
        "Changed".cyan(),
        summary.changed_entries(),
        summary.entries.len()
    );
    Ok(())
}

pub fn print_plan(changes: &[PlannedChange], format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(changes);
    }
    if changes.is_empty() {
        println!("No changes. Pools and clients are up to date.");
        return Ok(());
    }
    let mut builder = Builder::default();
    builder.push_record(["Action", "Target", "Attributes"]);
    for change in changes {
        match change {
            PlannedChange::AddAttributes {
                user_pool_id,
                attributes,
            } => {
                let names: Vec<String> = attributes.iter().map(|a| a.name.clone()).collect();
                builder.push_record([
                    "add attributes".to_string(),
                    user_pool_id.clone(),
                    join_or_dash(&names),
                ]);
            }
            PlannedChange::UpdateClient(update) => {
                builder.push_record([
                    "update client".to_string(),
                    format!("{}/{}", update.user_pool_id, update.client_id),
                    format!(
                        "read: {}; write: {}",
                        join_or_dash(&update.read_attributes),
                        join_or_dash(&update.write_attributes)
                    ),
                ]);
            }
        }
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}

pub fn print_entries(entries: &[MappingEntry], format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(entries);
    }
    let mut builder = Builder::default();
    builder.push_record(["UserPoolOutputKey", "ClientOutputKey", "Attributes"]);
    for entry in entries {
        let names: Vec<String> = entry
            .custom_attributes
            .iter()
            .map(|a| format!("{} ({})", a.name, a.attribute_data_type))
            .collect();
        builder.push_record([
            entry.user_pool_output_key.clone(),
            entry.client_output_key.clone().unwrap_or_else(|| "-".into()),
            join_or_dash(&names),
        ]);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}
