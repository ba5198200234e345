//! End-to-end dispatch over a stream of messages.

use opwire_buffer::WireBuffer;
use opwire_dispatch::{
    Diagnostic, DispatchConfig, Dispatched, Dispatcher, Handler, OpcodeTable, ParseError,
    Routines,
};

const PAIRS: u8 = 16;
const RECORDS: u8 = 32;
const LADDER: u8 = 49;

#[derive(Debug, Default)]
struct Recorder {
    pairs: Vec<(u16, Vec<(u32, u32)>)>,
    records: Vec<(u32, String)>,
    ladder: Vec<(u32, String)>,
}

impl Recorder {
    // uint16 n, then n (uint32, uint32) pairs.
    fn parse_pairs(&mut self, buf: &mut WireBuffer) -> Result<(), ParseError> {
        let n = buf.pop_uint16()?;
        let mut pairs = Vec::with_capacity(n as usize);
        for _ in 0..n {
            let a = buf.pop_uint32()?;
            let b = buf.pop_uint32()?;
            pairs.push((a, b));
        }
        self.pairs.push((n, pairs));
        Ok(())
    }

    // (uint32 id, null_str16 name) records until a zero id.
    fn parse_records(&mut self, buf: &mut WireBuffer) -> Result<(), ParseError> {
        while buf.peek_uint32()? > 0 {
            let id = buf.pop_uint32()?;
            let name = buf.pop_null_str16()?;
            self.records.push((id, name));
        }
        buf.pop_uint32()?;
        Ok(())
    }

    // uint32 count, then (uint32 id, len_str8 name).
    fn parse_ladder(&mut self, buf: &mut WireBuffer) -> Result<(), ParseError> {
        let count = buf.pop_uint32()?;
        for _ in 0..count {
            let id = buf.pop_uint32()?;
            let name = buf.pop_len_str8()?;
            self.ladder.push((id, name));
        }
        Ok(())
    }
}

impl Handler for Recorder {
    fn routines(&self) -> Routines<Self> {
        Routines::new()
            .register("pairs", Self::parse_pairs)
            .register("records", Self::parse_records)
            .register("ladder", Self::parse_ladder)
    }
}

fn dispatcher() -> Dispatcher<Recorder, Vec<Diagnostic>> {
    let table =
        OpcodeTable::from_pairs(&[(PAIRS, "pairs"), (RECORDS, "records"), (LADDER, "ladder")])
            .unwrap();
    Dispatcher::with_config(
        table,
        Recorder::default(),
        DispatchConfig::default(),
        Vec::new(),
    )
    .unwrap()
}

fn pairs_message(pairs: &[(u32, u32)]) -> WireBuffer {
    let mut buf = WireBuffer::with_opcode(PAIRS);
    buf.push_uint16(pairs.len() as u16);
    for (a, b) in pairs {
        buf.push_uint32(*a);
        buf.push_uint32(*b);
    }
    buf
}

#[test]
fn counted_pairs_example_bytes_and_decode() {
    let msg = pairs_message(&[(1, 2), (3, 4)]);
    assert_eq!(
        msg.as_bytes(),
        &[
            0x10, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00,
            0x00, 0x04, 0x00, 0x00, 0x00
        ]
    );

    let mut d = dispatcher();
    let outcome = d.dispatch(msg).unwrap();
    assert!(outcome.is_handled());
    assert_eq!(d.handler().pairs, vec![(2, vec![(1, 2), (3, 4)])]);
}

#[test]
fn truncated_middle_message_does_not_affect_neighbours() {
    let first = pairs_message(&[(1, 2)]);
    let full_second = pairs_message(&[(5, 6), (7, 8)]);
    let second = WireBuffer::from(&full_second.as_bytes()[..full_second.len() - 3]);
    let third = pairs_message(&[(9, 10), (11, 12)]);

    let mut d = dispatcher();
    let outcomes: Vec<Dispatched> = [first, second, third]
        .into_iter()
        .map(|msg| d.dispatch(msg).unwrap())
        .collect();

    assert!(outcomes[0].is_handled());
    assert!(matches!(outcomes[1], Dispatched::Malformed { opcode: PAIRS, .. }));
    assert!(outcomes[2].is_handled());

    assert_eq!(
        d.handler().pairs,
        vec![(1, vec![(1, 2)]), (2, vec![(9, 10), (11, 12)])]
    );
    assert_eq!(d.sink().len(), 1);
    assert!(d.sink()[0].to_string().starts_with("Parsing pairs packet failed"));
}

#[test]
fn unknown_opcode_emits_one_diagnostic_and_decodes_nothing() {
    let mut d = dispatcher();
    let mut msg = WireBuffer::with_opcode(200);
    msg.push_uint16(1);
    msg.push_uint32(1);
    msg.push_uint32(2);

    assert_eq!(d.dispatch(msg).unwrap(), Dispatched::UnknownOpcode(200));
    assert_eq!(d.sink(), &vec![Diagnostic::UnknownOpcode { opcode: 200 }]);
    assert!(d.handler().pairs.is_empty());
    assert!(d.handler().records.is_empty());
    assert!(d.handler().ladder.is_empty());
}

#[test]
fn sentinel_terminated_records() {
    let mut msg = WireBuffer::with_opcode(RECORDS);
    msg.push_uint32(7);
    msg.push_null_str16("seven");
    msg.push_uint32(8);
    msg.push_null_str16("");
    msg.push_uint32(0);

    let mut d = dispatcher();
    let outcome = d.dispatch(msg).unwrap();
    assert_eq!(
        outcome,
        Dispatched::Handled {
            opcode: RECORDS,
            name: "records".to_string(),
            trailing: 0
        }
    );
    assert_eq!(
        d.handler().records,
        vec![(7, "seven".to_string()), (8, String::new())]
    );
}

#[test]
fn records_without_sentinel_are_malformed() {
    let mut msg = WireBuffer::with_opcode(RECORDS);
    msg.push_uint32(7);
    msg.push_null_str16("seven");

    let mut d = dispatcher();
    assert!(matches!(
        d.dispatch(msg).unwrap(),
        Dispatched::Malformed { opcode: RECORDS, .. }
    ));
}

#[test]
fn length_prefixed_ladder_and_merged_messages() {
    let mut head = WireBuffer::with_opcode(LADDER);
    head.push_uint32(2);
    let mut body = WireBuffer::new();
    body.push_uint32(10);
    body.push_len_str8("alpha");
    body.push_uint32(20);
    body.push_len_str8("");

    let mut d = dispatcher();
    d.dispatch(head + body).unwrap();
    assert_eq!(
        d.handler().ladder,
        vec![(10, "alpha".to_string()), (20, String::new())]
    );
    assert!(d.sink().is_empty());
}

#[test]
fn prop_arbitrary_messages_never_abort_dispatch() {
    use proptest::prelude::*;

    proptest!(|(messages in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..48), 1..16))| {
        let mut d = dispatcher();
        for bytes in messages {
            let outcome = d.dispatch(WireBuffer::from(bytes));
            prop_assert!(outcome.is_ok());
        }

        // A well-formed message still decodes after any amount of garbage.
        let before = d.handler().pairs.len();
        prop_assert!(d.dispatch(pairs_message(&[(1, 2)])).unwrap().is_handled());
        prop_assert_eq!(d.handler().pairs.len(), before + 1);
    });
}
