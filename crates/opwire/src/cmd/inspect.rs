use opwire::buffer::render;
use serde::Serialize;

use crate::cmd::{collect_messages, InspectArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct InspectOutput<'a> {
    index: usize,
    len: usize,
    opcode: Option<u8>,
    rendered: &'a str,
}

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let messages = collect_messages(args.messages.as_ref(), &args.hex)?;

    for (index, bytes) in messages.iter().enumerate() {
        let rendered = render(bytes);
        match format {
            OutputFormat::Json => {
                let out = InspectOutput {
                    index,
                    len: bytes.len(),
                    opcode: bytes.first().copied(),
                    rendered: &rendered,
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputFormat::Table | OutputFormat::Pretty => {
                println!("[{index}] {} bytes: {rendered}", bytes.len());
            }
        }
    }

    Ok(SUCCESS)
}
