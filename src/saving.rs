use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Load a JSON collection from disk.
///
/// A missing file is an empty collection, not an error; anything else that
/// goes wrong is reported as a message.
pub fn load_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, String> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let data = fs::read_to_string(path)
        .map_err(|_| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&data).map_err(|_| format!("Failed to parse {}", path.display()))
}

/// Save a JSON collection to disk, pretty-printed.
pub fn save_collection<T: Serialize>(path: &Path, items: &[T]) -> Result<(), String> {
    let json = serde_json::to_string_pretty(items)
        .map_err(|_| "Failed to serialize collection".to_string())?;

    fs::write(path, json).map_err(|_| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        name: String,
        count: u32,
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let loaded: Vec<Entry> = load_collection(&path).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.json");

        let entries = vec![
            Entry {
                name: "first".to_string(),
                count: 1,
            },
            Entry {
                name: "second".to_string(),
                count: 2,
            },
        ];

        save_collection(&path, &entries).unwrap();
        let loaded: Vec<Entry> = load_collection(&path).unwrap();
        assert_eq!(loaded, entries);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let result: Result<Vec<Entry>, String> = load_collection(&path);
        assert!(result.is_err());
    }
}
