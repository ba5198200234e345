use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use opwire::layout::Value;
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Handled,
    UnknownOpcode,
    Malformed,
    Empty,
}

impl Status {
    fn as_str(self) -> &'static str {
        match self {
            Status::Handled => "handled",
            Status::UnknownOpcode => "unknown_opcode",
            Status::Malformed => "malformed",
            Status::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldOutput {
    pub name: String,
    pub value: Value,
}

/// One line of `decode` output.
#[derive(Debug, Clone, Serialize)]
pub struct MessageReport {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opcode: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: Status,
    pub fields: Vec<FieldOutput>,
    pub trailing: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub raw: String,
}

pub fn print_reports(reports: &[MessageReport], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for report in reports {
                println!(
                    "{}",
                    serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "OPCODE", "MESSAGE", "STATUS", "FIELDS"]);
            for report in reports {
                table.add_row(vec![
                    report.index.to_string(),
                    report.opcode.map(|op| op.to_string()).unwrap_or_default(),
                    report.message.clone().unwrap_or_default(),
                    report.status.as_str().to_string(),
                    summary(report),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for report in reports {
                println!(
                    "[{}] opcode={} message={} status={} {}",
                    report.index,
                    report
                        .opcode
                        .map(|op| op.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    report.message.as_deref().unwrap_or("-"),
                    report.status.as_str(),
                    summary(report)
                );
            }
        }
    }
}

fn summary(report: &MessageReport) -> String {
    if let Some(detail) = &report.detail {
        return detail.clone();
    }
    let mut parts: Vec<String> = report
        .fields
        .iter()
        .map(|field| format!("{}={}", field.name, field.value))
        .collect();
    if report.trailing > 0 {
        parts.push(format!("(+{} trailing bytes)", report.trailing));
    }
    parts.join(" ")
}
