use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use opwire_buffer::WireBuffer;

use crate::error::ParseError;

/// Decodes one message type from the bytes following its opcode.
///
/// A routine pops its fields in the order the message defines. It may leave
/// trailing bytes unread.
pub type Routine<H> = Rc<dyn Fn(&mut H, &mut WireBuffer) -> Result<(), ParseError>>;

/// Name-keyed decode routines for a handler type.
pub struct Routines<H> {
    by_name: HashMap<String, Routine<H>>,
}

impl<H> Routines<H> {
    pub fn new() -> Self {
        Self {
            by_name: HashMap::new(),
        }
    }

    /// Register the routine that decodes messages called `name`.
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn register<F>(mut self, name: impl Into<String>, routine: F) -> Self
    where
        F: Fn(&mut H, &mut WireBuffer) -> Result<(), ParseError> + 'static,
    {
        self.by_name.insert(name.into(), Rc::new(routine));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Registered names in ascending order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub(crate) fn get(&self, name: &str) -> Option<Routine<H>> {
        self.by_name.get(name).cloned()
    }
}

impl<H> Default for Routines<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for Routines<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Routines")
            .field("names", &self.names())
            .finish()
    }
}

/// A value that decodes messages.
///
/// `routines` is its capability set: one routine per message name it
/// understands. A dispatcher binds these to an opcode table once, at
/// construction.
pub trait Handler: Sized {
    fn routines(&self) -> Routines<Self>;
}
