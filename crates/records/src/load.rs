use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use foundation::RecordId;

use crate::record::Record;

#[derive(Debug)]
pub enum RecordLoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    DuplicateId(RecordId),
    InvalidPosition {
        id: RecordId,
        longitude: f64,
        latitude: f64,
    },
    InvalidScore {
        id: RecordId,
        score: u8,
    },
}

impl std::fmt::Display for RecordLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordLoadError::Io { path, source } => {
                write!(f, "failed to read records from {}: {source}", path.display())
            }
            RecordLoadError::Parse(e) => write!(f, "failed to parse records: {e}"),
            RecordLoadError::DuplicateId(id) => write!(f, "duplicate record id {id}"),
            RecordLoadError::InvalidPosition {
                id,
                longitude,
                latitude,
            } => write!(
                f,
                "record {id} has an invalid position (lon={longitude}, lat={latitude})"
            ),
            RecordLoadError::InvalidScore { id, score } => {
                write!(f, "record {id} has conversion score {score} outside 0..=100")
            }
        }
    }
}

impl std::error::Error for RecordLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordLoadError::Io { source, .. } => Some(source),
            RecordLoadError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

/// Checks the load-time invariants: unique ids, positions on the globe and
/// scores within 0..=100. Missing optional attributes are fine.
pub fn validate_records(records: &[Record]) -> Result<(), RecordLoadError> {
    let mut seen: BTreeSet<RecordId> = BTreeSet::new();
    for r in records {
        if !seen.insert(r.id) {
            return Err(RecordLoadError::DuplicateId(r.id));
        }
        if !r.position().is_valid() {
            return Err(RecordLoadError::InvalidPosition {
                id: r.id,
                longitude: r.longitude,
                latitude: r.latitude,
            });
        }
        if let Some(score) = r.conversion_score
            && score > 100
        {
            return Err(RecordLoadError::InvalidScore { id: r.id, score });
        }
    }
    Ok(())
}

pub fn load_records_from_str(payload: &str) -> Result<Vec<Record>, RecordLoadError> {
    let records: Vec<Record> = serde_json::from_str(payload).map_err(RecordLoadError::Parse)?;
    validate_records(&records)?;
    Ok(records)
}

pub fn load_records_from_path(path: impl AsRef<Path>) -> Result<Vec<Record>, RecordLoadError> {
    let path = path.as_ref();
    let payload = fs::read_to_string(path).map_err(|e| RecordLoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_records_from_str(&payload)
}

#[cfg(test)]
mod tests {
    use super::{RecordLoadError, load_records_from_path, load_records_from_str};
    use foundation::RecordId;

    #[test]
    fn loads_a_valid_array() {
        let records = load_records_from_str(
            r#"[{"id":1,"latitude":10,"longitude":20},{"id":2,"latitude":-5,"longitude":-7.5}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, RecordId(2));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = load_records_from_str(
            r#"[{"id":1,"latitude":0,"longitude":0},{"id":1,"latitude":1,"longitude":1}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, RecordLoadError::DuplicateId(RecordId(1))));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = load_records_from_str(r#"[{"id":3,"latitude":91,"longitude":0}]"#).unwrap_err();
        assert!(matches!(err, RecordLoadError::InvalidPosition { .. }));

        let err = load_records_from_str(
            r#"[{"id":4,"latitude":0,"longitude":0,"conversionScore":101}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, RecordLoadError::InvalidScore { score: 101, .. }));
        assert_eq!(
            err.to_string(),
            "record 4 has conversion score 101 outside 0..=100"
        );
    }

    #[test]
    fn reports_parse_and_io_errors() {
        assert!(matches!(
            load_records_from_str("{not json").unwrap_err(),
            RecordLoadError::Parse(_)
        ));
        let err = load_records_from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, RecordLoadError::Io { .. }));
    }
}
