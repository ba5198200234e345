use opwire::buffer::{render, WireBuffer};
use opwire::dispatch::{
    DiagnosticSink, DispatchConfig, DispatchError, Dispatched, Dispatcher, LogSink,
};
use opwire::layout::{self, LayoutHandler};

use crate::cmd::{collect_messages, DecodeArgs};
use crate::exit::{dispatch_error, layout_error, CliResult, DATA_INVALID, FAILURE, SUCCESS};
use crate::output::{print_reports, FieldOutput, MessageReport, OutputFormat, Status};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let (table, handler) =
        layout::from_path(&args.layouts).map_err(|err| layout_error("layout load failed", err))?;
    let config = DispatchConfig {
        report_trailing_bytes: args.report_trailing,
        ..DispatchConfig::default()
    };
    let mut dispatcher = Dispatcher::with_config(table, handler, config, LogSink)
        .map_err(|err| dispatch_error("layout binding failed", err))?;

    let messages = collect_messages(args.messages.as_ref(), &args.hex)?;
    tracing::debug!(count = messages.len(), "decoding messages");

    let mut reports = Vec::with_capacity(messages.len());
    for (index, bytes) in messages.into_iter().enumerate() {
        reports.push(decode_one(&mut dispatcher, index, bytes)?);
    }

    print_reports(&reports, format);

    let handled = reports.iter().filter(|r| r.status == Status::Handled).count();
    if handled == 0 {
        return Ok(FAILURE);
    }
    if args.strict && handled < reports.len() {
        return Ok(DATA_INVALID);
    }
    Ok(SUCCESS)
}

fn decode_one<S: DiagnosticSink>(
    dispatcher: &mut Dispatcher<LayoutHandler, S>,
    index: usize,
    bytes: Vec<u8>,
) -> CliResult<MessageReport> {
    let mut report = MessageReport {
        index,
        opcode: bytes.first().copied(),
        message: None,
        status: Status::Handled,
        fields: Vec::new(),
        trailing: 0,
        detail: None,
        raw: render(&bytes),
    };

    match dispatcher.dispatch(WireBuffer::from(bytes)) {
        Ok(Dispatched::Handled { name, trailing, .. }) => {
            if let Some(decoded) = dispatcher.handler_mut().take_last() {
                report.fields = decoded
                    .fields
                    .into_iter()
                    .map(|(name, value)| FieldOutput { name, value })
                    .collect();
            }
            report.message = Some(name);
            report.trailing = trailing;
        }
        Ok(Dispatched::UnknownOpcode(opcode)) => {
            report.status = Status::UnknownOpcode;
            report.detail = Some(format!("Unknown packet {opcode}"));
        }
        Ok(Dispatched::Malformed { name, error, .. }) => {
            report.status = Status::Malformed;
            report.detail = Some(error.to_string());
            report.message = Some(name);
        }
        Err(DispatchError::Underflow(_)) => {
            report.status = Status::Empty;
            report.detail = Some("empty message".to_string());
        }
        Err(err) => return Err(dispatch_error(&format!("message {index}"), err)),
    }

    Ok(report)
}
