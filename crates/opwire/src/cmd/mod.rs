use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod inspect;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode captured messages using a JSON layout file.
    Decode(DecodeArgs),
    /// Render raw messages in diagnostic form.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Layout file mapping opcodes to message field lists.
    #[arg(long, short = 'l', value_name = "FILE", env = "OPWIRE_LAYOUTS")]
    pub layouts: PathBuf,
    /// Read messages from a file, one hex-encoded message per line.
    #[arg(long, short = 'm', value_name = "FILE")]
    pub messages: Option<PathBuf>,
    /// Hex-encoded messages (whitespace between bytes is allowed).
    #[arg(value_name = "HEX")]
    pub hex: Vec<String>,
    /// Report bytes left over after a message decodes.
    #[arg(long)]
    pub report_trailing: bool,
    /// Exit with the data-invalid code if any message was not decoded.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Read messages from a file, one hex-encoded message per line.
    #[arg(long, short = 'm', value_name = "FILE")]
    pub messages: Option<PathBuf>,
    /// Hex-encoded messages.
    #[arg(value_name = "HEX")]
    pub hex: Vec<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Gather messages from a messages file followed by positional hex arguments.
pub fn collect_messages(file: Option<&PathBuf>, hex: &[String]) -> CliResult<Vec<Vec<u8>>> {
    let mut messages = Vec::new();

    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let bytes = parse_hex(line).map_err(|err| {
                CliError::new(
                    USAGE,
                    format!("{}:{}: {}", path.display(), line_no + 1, err.message),
                )
            })?;
            messages.push(bytes);
        }
    }

    for arg in hex {
        messages.push(parse_hex(arg)?);
    }

    if messages.is_empty() {
        return Err(CliError::new(
            USAGE,
            "no messages given (pass HEX arguments or --messages)",
        ));
    }
    Ok(messages)
}

/// Decode hex, ignoring whitespace and an optional `0x` prefix.
pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact)
        .map_err(|err| CliError::new(USAGE, format!("invalid hex message {input:?}: {err}")))
}
