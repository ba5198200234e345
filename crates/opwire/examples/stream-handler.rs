//! Decode a short captured stream with a hand-written handler.
//!
//! Run with:
//!   cargo run -p opwire --example stream-handler
//!
//! The messages are built in-process with the push operations, so the example
//! needs no capture file. The third message is cut short on purpose and the
//! fourth uses an opcode with no table entry.

use opwire::buffer::WireBuffer;
use opwire::dispatch::{
    Diagnostic, DispatchConfig, Dispatched, Dispatcher, Handler, OpcodeTable, ParseError,
    Routines,
};

const WORLD_UPDATE: u8 = 16;
const POSITION: u8 = 17;
const LEADERBOARD: u8 = 49;

#[derive(Debug, Default)]
struct World {
    eaten: Vec<(u32, u32)>,
    cells: Vec<(u32, String)>,
    position: Option<(f64, f64, f64)>,
    leaderboard: Vec<(u32, String)>,
}

impl World {
    fn world_update(&mut self, buf: &mut WireBuffer) -> Result<(), ParseError> {
        let n = buf.pop_uint16()?;
        for _ in 0..n {
            let eater = buf.pop_uint32()?;
            let eaten = buf.pop_uint32()?;
            self.eaten.push((eater, eaten));
        }
        // Cell records run until a zero id.
        while buf.peek_uint32()? > 0 {
            let id = buf.pop_uint32()?;
            let _x = buf.pop_float64()?;
            let _y = buf.pop_float64()?;
            let _size = buf.pop_float64()?;
            let _color = buf.pop_uint32()?;
            let flags = buf.pop_uint8()?;
            let mut skip = 0;
            if flags & 2 != 0 {
                skip += 4;
            }
            if flags & 4 != 0 {
                skip += 8;
            }
            if flags & 8 != 0 {
                skip += 16;
            }
            buf.skip(skip)?;
            let name = buf.pop_null_str16()?;
            self.cells.push((id, name));
        }
        buf.pop_uint32()?;
        Ok(())
    }

    fn position(&mut self, buf: &mut WireBuffer) -> Result<(), ParseError> {
        let x = buf.pop_float64()?;
        let y = buf.pop_float64()?;
        let size = buf.pop_float64()?;
        self.position = Some((x, y, size));
        Ok(())
    }

    fn leaderboard(&mut self, buf: &mut WireBuffer) -> Result<(), ParseError> {
        let count = buf.pop_uint32()?;
        let mut entries = Vec::with_capacity(count.min(64) as usize);
        for _ in 0..count {
            let id = buf.pop_uint32()?;
            let name = buf.pop_null_str16()?;
            entries.push((id, name));
        }
        self.leaderboard = entries;
        Ok(())
    }
}

impl Handler for World {
    fn routines(&self) -> Routines<Self> {
        Routines::new()
            .register("world_update", Self::world_update)
            .register("position", Self::position)
            .register("leaderboard", Self::leaderboard)
    }
}

fn capture() -> Vec<WireBuffer> {
    let mut update = WireBuffer::with_opcode(WORLD_UPDATE);
    update.push_uint16(1);
    update.push_uint32(7);
    update.push_uint32(9);
    update.push_uint32(7);
    for v in [10.0, 20.0, 32.5] {
        update.push_float64(v);
    }
    update.push_uint32(0x00ff_8800);
    update.push_uint8(2);
    update.push_bytes(&[0; 4]);
    update.push_null_str16("blob");
    update.push_uint32(0);

    let mut position = WireBuffer::with_opcode(POSITION);
    for v in [10.5, 20.25, 33.0] {
        position.push_float64(v);
    }

    let mut leaderboard = WireBuffer::with_opcode(LEADERBOARD);
    leaderboard.push_uint32(2);
    leaderboard.push_uint32(7);
    leaderboard.push_null_str16("blob");
    leaderboard.push_uint32(3);
    leaderboard.push_null_str16("Ωmega");
    let truncated = WireBuffer::from(&leaderboard.as_bytes()[..leaderboard.len() - 3]);

    let unknown = WireBuffer::with_opcode(99);

    vec![update, position, truncated, unknown]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let table = OpcodeTable::from_pairs(&[
        (WORLD_UPDATE, "world_update"),
        (POSITION, "position"),
        (LEADERBOARD, "leaderboard"),
    ])?;
    let mut dispatcher: Dispatcher<World, Vec<Diagnostic>> = Dispatcher::with_config(
        table,
        World::default(),
        DispatchConfig {
            report_trailing_bytes: true,
            ..DispatchConfig::default()
        },
        Vec::new(),
    )?;

    for message in capture() {
        eprintln!("RECV {message}");
        match dispatcher.dispatch(message)? {
            Dispatched::Handled { name, .. } => eprintln!("  handled {name}"),
            other => eprintln!("  skipped opcode {}", other.opcode()),
        }
    }

    let world = dispatcher.handler();
    println!("eaten: {:?}", world.eaten);
    println!("cells: {:?}", world.cells);
    println!("position: {:?}", world.position);
    println!("leaderboard: {:?}", world.leaderboard);
    for diagnostic in dispatcher.sink() {
        println!("diagnostic: {diagnostic}");
    }
    Ok(())
}
