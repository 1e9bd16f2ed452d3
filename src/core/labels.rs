//! Class-index to label mapping.
//!
//! A [`LabelTable`] is the ordered list of human-readable class names a model
//! was trained on, loaded once at startup and shared read-only across all
//! requests. The standard on-disk format is a JSON array of strings where the
//! array index is the class index (the `imagenet_classes.json` layout).

use crate::core::errors::{ClassifyError, ClassifyResult};
use std::path::Path;
use std::sync::Arc;

/// Ordered, immutable mapping from class index to label string.
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: Vec<Arc<str>>,
}

impl LabelTable {
    /// Creates a label table from an ordered list of label strings.
    pub fn new(labels: impl IntoIterator<Item = impl Into<Arc<str>>>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Loads a label table from a JSON file containing an array of strings.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, an invalid-input error
    /// if the JSON is not an array of strings, or a configuration error if
    /// the array is empty.
    pub fn from_json_file(path: impl AsRef<Path>) -> ClassifyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let labels: Vec<String> = serde_json::from_str(&raw).map_err(|e| {
            ClassifyError::invalid_input(format!(
                "label file '{}' is not a JSON array of strings: {}",
                path.display(),
                e
            ))
        })?;
        if labels.is_empty() {
            return Err(ClassifyError::config_error(format!(
                "label file '{}' contains no labels",
                path.display()
            )));
        }
        Ok(Self::new(labels))
    }

    /// Looks up the label for a class index.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::LabelIndexOutOfRange`] if `index` is not
    /// below the table size.
    pub fn lookup(&self, index: usize) -> ClassifyResult<&Arc<str>> {
        self.labels
            .get(index)
            .ok_or(ClassifyError::LabelIndexOutOfRange {
                index,
                len: self.labels.len(),
            })
    }

    /// Returns the label for a class index, if present.
    pub fn get(&self, index: usize) -> Option<&Arc<str>> {
        self.labels.get(index)
    }

    /// Number of classes in the table.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if the table holds no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_lookup_in_range() {
        let table = LabelTable::new(["tench", "goldfish", "great white shark"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup(0).unwrap().as_ref(), "tench");
        assert_eq!(table.lookup(2).unwrap().as_ref(), "great white shark");
    }

    #[test]
    fn test_lookup_out_of_range() {
        let table = LabelTable::new(["tench", "goldfish"]);
        let err = table.lookup(2).unwrap_err();
        match err {
            ClassifyError::LabelIndexOutOfRange { index, len } => {
                assert_eq!(index, 2);
                assert_eq!(len, 2);
            }
            other => panic!("expected LabelIndexOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["cat", "dog", "bird"]"#).unwrap();

        let table = LabelTable::from_json_file(file.path()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup(1).unwrap().as_ref(), "dog");
    }

    #[test]
    fn test_from_json_file_rejects_non_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"0": "cat"}}"#).unwrap();

        assert!(LabelTable::from_json_file(file.path()).is_err());
    }

    #[test]
    fn test_from_json_file_rejects_empty_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();

        assert!(LabelTable::from_json_file(file.path()).is_err());
    }
}
