use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::config::DispatchConfig;
use crate::error::{DispatchError, Result};

/// Opcode-keyed map of message names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpcodeTable {
    names: HashMap<u8, String>,
}

impl OpcodeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `opcode` to the message `name`.
    pub fn insert(&mut self, opcode: u8, name: impl Into<String>) -> Result<()> {
        if self.names.contains_key(&opcode) {
            return Err(DispatchError::DuplicateOpcode(opcode));
        }
        self.names.insert(opcode, name.into());
        Ok(())
    }

    /// Build a table from embedded `(opcode, name)` pairs.
    pub fn from_pairs(pairs: &[(u8, &str)]) -> Result<Self> {
        let mut table = Self::new();
        for (opcode, name) in pairs {
            table.insert(*opcode, *name)?;
        }
        Ok(table)
    }

    /// Parse a JSON object of `"opcode": "name"` entries.
    ///
    /// ```text
    /// { "16": "world_update", "49": "leaderboard" }
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let names: HashMap<u8, String> = serde_json::from_str(json)?;
        Self::from_map(names)
    }

    /// Load a table from a JSON file with default limits.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_path_with_config(path, &DispatchConfig::default())
    }

    /// Load a table from a JSON file, bounded by `config.max_table_file_size`.
    pub fn from_path_with_config(path: &Path, config: &DispatchConfig) -> Result<Self> {
        let content = read_bounded(path, config.max_table_file_size)?;
        Self::from_json(&content)
    }

    /// Build a table from an already-deserialized map.
    pub fn from_map(names: HashMap<u8, String>) -> Result<Self> {
        if let Some((opcode, _)) = names.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(DispatchError::InvalidTable(format!(
                "opcode {opcode} has an empty message name"
            )));
        }
        Ok(Self { names })
    }

    /// Message name for `opcode`, if mapped.
    pub fn name(&self, opcode: u8) -> Option<&str> {
        self.names.get(&opcode).map(String::as_str)
    }

    pub fn contains(&self, opcode: u8) -> bool {
        self.names.contains_key(&opcode)
    }

    /// Mapped opcodes in ascending order.
    pub fn opcodes(&self) -> Vec<u8> {
        let mut opcodes: Vec<u8> = self.names.keys().copied().collect();
        opcodes.sort_unstable();
        opcodes
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(opcode, name)` entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> {
        self.names.iter().map(|(opcode, name)| (*opcode, name.as_str()))
    }
}

/// Read a UTF-8 file, refusing anything larger than `max_bytes`.
pub fn read_bounded(path: &Path, max_bytes: usize) -> Result<String> {
    let file = std::fs::File::open(path).map_err(|err| {
        DispatchError::InvalidTable(format!("failed opening {}: {err}", path.display()))
    })?;
    let metadata = file
        .metadata()
        .map_err(|err| DispatchError::InvalidTable(err.to_string()))?;
    if !metadata.is_file() {
        return Err(DispatchError::InvalidTable(format!(
            "not a regular file: {}",
            path.display()
        )));
    }
    if metadata.len() > max_bytes as u64 {
        return Err(DispatchError::InvalidTable(format!(
            "file too large ({} bytes): {}",
            metadata.len(),
            path.display()
        )));
    }

    let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut content = String::new();
    file.take(read_limit)
        .read_to_string(&mut content)
        .map_err(|err| {
            DispatchError::InvalidTable(format!("failed reading {}: {err}", path.display()))
        })?;
    if content.len() > max_bytes {
        return Err(DispatchError::InvalidTable(format!(
            "file too large while reading: {}",
            path.display()
        )));
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn insert_and_lookup() {
        let mut table = OpcodeTable::new();
        table.insert(16, "world_update").unwrap();
        table.insert(49, "leaderboard").unwrap();

        assert_eq!(table.name(16), Some("world_update"));
        assert_eq!(table.name(17), None);
        assert!(table.contains(49));
        assert_eq!(table.opcodes(), vec![16, 49]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn duplicate_opcode_is_rejected() {
        let result = OpcodeTable::from_pairs(&[(16, "a"), (16, "b")]);
        assert!(matches!(result, Err(DispatchError::DuplicateOpcode(16))));
    }

    #[test]
    fn from_json_parses_numeric_keys() {
        let table = OpcodeTable::from_json(r#"{"16":"world_update","255":"handshake"}"#).unwrap();
        assert_eq!(table.name(16), Some("world_update"));
        assert_eq!(table.name(255), Some("handshake"));
    }

    #[test]
    fn from_json_rejects_out_of_range_and_empty_names() {
        assert!(matches!(
            OpcodeTable::from_json(r#"{"256":"too_big"}"#),
            Err(DispatchError::Json(_))
        ));
        assert!(matches!(
            OpcodeTable::from_json(r#"{"1":"  "}"#),
            Err(DispatchError::InvalidTable(_))
        ));
    }

    #[test]
    fn from_path_loads_and_enforces_size_limit() {
        let path = temp_file("table", r#"{"32":"hint","64":"border"}"#);

        let table = OpcodeTable::from_path(&path).unwrap();
        assert_eq!(table.opcodes(), vec![32, 64]);

        let config = DispatchConfig {
            max_table_file_size: 8,
            ..DispatchConfig::default()
        };
        assert!(matches!(
            OpcodeTable::from_path_with_config(&path, &config),
            Err(DispatchError::InvalidTable(_))
        ));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn from_path_missing_file() {
        let path = std::env::temp_dir().join("opwire-table-does-not-exist.json");
        assert!(matches!(
            OpcodeTable::from_path(&path),
            Err(DispatchError::InvalidTable(_))
        ));
    }

    fn temp_file(tag: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "opwire-{tag}-{}-{}.json",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::write(&path, contents.as_bytes()).unwrap();
        path
    }
}
