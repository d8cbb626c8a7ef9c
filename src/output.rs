//! Rendering of listing results on stdout

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::turbo::{AccountActions, AccountEntry, ActionSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text columns
    Table,
    Csv,
    Json,
}

const ACTION_HEADERS: [&str; 4] = ["Target UUID", "Target Name", "Action", "Action UUID"];

const ACCOUNT_HEADERS: [&str; 9] = [
    "Account Name",
    "Cloud Provider",
    "Cloud Account ID",
    "Savings|Investment",
    "$/h",
    "Target Name",
    "Target UUID",
    "Action to Take",
    "Reason for Action",
];

pub fn write_action_summaries<W: Write>(
    out: &mut W,
    format: OutputFormat,
    actions: &[ActionSummary],
) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return write_json(out, actions);
    }

    let rows: Vec<Vec<String>> = actions
        .iter()
        .map(|a| {
            vec![
                a.target_uuid.clone(),
                a.target_name.clone(),
                a.action.clone(),
                a.action_uuid.clone(),
            ]
        })
        .collect();

    write_rows(out, format, &ACTION_HEADERS, &rows)
}

pub fn write_account_actions<W: Write>(
    out: &mut W,
    format: OutputFormat,
    report: &[AccountActions],
) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return write_json(out, report);
    }

    let rows = account_rows(report);
    write_rows(out, format, &ACCOUNT_HEADERS, &rows)
}

/// Write one file per cloud account into `dir` and return the paths written
pub fn write_account_files(
    dir: &Path,
    format: OutputFormat,
    report: &[AccountActions],
    stamp: i64,
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(report.len());
    for account in report {
        let path = dir.join(account_file_name(account, format, stamp));
        let mut out = BufWriter::new(File::create(&path)?);
        write_account_actions(&mut out, format, std::slice::from_ref(account))?;
        out.flush()?;
        tracing::info!("Wrote actions for account {} to {}", account.account.account_id, path.display());
        written.push(path);
    }
    Ok(written)
}

fn account_file_name(account: &AccountActions, format: OutputFormat, stamp: i64) -> String {
    let mut name: String = account
        .account
        .name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if name.is_empty() {
        name = account.account.account_id.clone();
    }
    let extension = match format {
        OutputFormat::Table => "txt",
        OutputFormat::Csv => "csv",
        OutputFormat::Json => "json",
    };
    format!("turbo_actions_{}_{}.{}", name, stamp, extension)
}

/// Flatten the report. Accounts without actions and skipped items still get
/// a row so nothing disappears from the sheet.
fn account_rows(report: &[AccountActions]) -> Vec<Vec<String>> {
    if report.is_empty() {
        return vec![padded(vec!["No cloud accounts found.".to_string()])];
    }

    let mut rows = Vec::new();
    for entry in report {
        let account = &entry.account;
        let prefix = || {
            vec![
                account.name.clone(),
                account.cloud_type.clone(),
                account.account_id.clone(),
            ]
        };

        if entry.entries.is_empty() {
            let mut row = prefix();
            row.push("No actions found for this cloud account".to_string());
            rows.push(padded(row));
        }

        // Skipped items stay where the cursor hit them
        for item in &entry.entries {
            let mut row = prefix();
            match item {
                AccountEntry::Action(action) => row.extend([
                    action.kind.map(|k| k.as_str().to_string()).unwrap_or_default(),
                    action.amount.map(|a| a.to_string()).unwrap_or_default(),
                    action.target_name.clone(),
                    action.target_uuid.clone(),
                    action.details.clone(),
                    action.reason.clone(),
                ]),
                AccountEntry::Skipped { cursor } => row.extend([
                    "*****".to_string(),
                    String::new(),
                    "SKIPPED ITEM".to_string(),
                    cursor.clone(),
                ]),
            }
            rows.push(padded(row));
        }
    }
    rows
}

fn padded(mut row: Vec<String>) -> Vec<String> {
    row.resize(ACCOUNT_HEADERS.len(), String::new());
    row
}

fn write_json<W: Write, T: serde::Serialize + ?Sized>(out: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn write_rows<W: Write>(
    out: &mut W,
    format: OutputFormat,
    headers: &[&str],
    rows: &[Vec<String>],
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(headers)?;
            for row in rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => write_table(out, headers, rows)?,
        OutputFormat::Json => write_json(out, rows)?,
    }
    Ok(())
}

fn write_table<W: Write>(out: &mut W, headers: &[&str], rows: &[Vec<String>]) -> std::io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(headers.to_vec()))?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "{}", line(rule.iter().map(String::as_str).collect()))?;
    for row in rows {
        writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}
