use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("failed to read label file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse label file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("label table is empty")]
    Empty,

    #[error("label index {0} is not a valid integer")]
    BadIndex(String),

    #[error("label indices are not contiguous from 0 (missing index {0})")]
    NonContiguous(usize),
}

/// Index-to-name mapping for the model's output categories.
///
/// Loaded once at startup from a JSON object keyed by stringified indices,
/// e.g. `{"0": "Healthy", "1": "Diseased"}`. The index set must cover
/// `[0, N)` exactly so that it lines up with the model's output ordering.
/// Read-only for the life of the process.
pub struct LabelTable {
    names: Vec<String>,
}

impl LabelTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LabelError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, LabelError> {
        let entries: BTreeMap<String, String> = serde_json::from_str(raw)?;
        if entries.is_empty() {
            return Err(LabelError::Empty);
        }

        let mut names: Vec<Option<String>> = vec![None; entries.len()];
        for (key, name) in entries {
            let index: usize = key
                .parse()
                .map_err(|_| LabelError::BadIndex(key.clone()))?;
            if index >= names.len() {
                return Err(LabelError::NonContiguous(find_gap(&names)));
            }
            names[index] = Some(name);
        }

        match find_gap(&names) {
            missing if missing < names.len() => Err(LabelError::NonContiguous(missing)),
            _ => Ok(Self {
                names: names.into_iter().flatten().collect(),
            }),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn find_gap(names: &[Option<String>]) -> usize {
    names.iter().position(Option::is_none).unwrap_or(names.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_table() {
        let table = LabelTable::from_json(r#"{"0": "Healthy", "1": "Diseased"}"#).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0), Some("Healthy"));
        assert_eq!(table.get(1), Some("Diseased"));
        assert_eq!(table.get(2), None);
    }

    #[test]
    fn test_unordered_keys_are_sorted_by_index() {
        let table =
            LabelTable::from_json(r#"{"2": "c", "0": "a", "1": "b"}"#).unwrap();
        assert_eq!(table.get(0), Some("a"));
        assert_eq!(table.get(2), Some("c"));
    }

    #[test]
    fn test_rejects_empty_table() {
        let result = LabelTable::from_json("{}");
        assert!(matches!(result, Err(LabelError::Empty)));
    }

    #[test]
    fn test_rejects_gap_in_indices() {
        let result = LabelTable::from_json(r#"{"0": "a", "2": "c"}"#);
        assert!(matches!(result, Err(LabelError::NonContiguous(1))));
    }

    #[test]
    fn test_rejects_non_integer_index() {
        let result = LabelTable::from_json(r#"{"zero": "a"}"#);
        assert!(matches!(result, Err(LabelError::BadIndex(_))));
    }

    #[test]
    fn test_rejects_non_object_json() {
        assert!(LabelTable::from_json(r#"["a", "b"]"#).is_err());
        assert!(LabelTable::from_json("not json").is_err());
    }
}
