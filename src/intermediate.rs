//! The JSON file bridging the detector and the builder.

use crate::error::{BlueprintError, Result};
use crate::models::DetectionRecord;
use std::path::Path;
use tracing::debug;

/// Serialize records the way they are written to disk
pub fn to_json(records: &[DetectionRecord]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

/// Parse a full record list; any malformed element fails the whole list
pub fn from_json(text: &str) -> Result<Vec<DetectionRecord>> {
    serde_json::from_str(text).map_err(|e| BlueprintError::MalformedInput(e.to_string()))
}

/// Write the record list, replacing any existing file
pub fn write_records<P: AsRef<Path>>(path: P, records: &[DetectionRecord]) -> Result<()> {
    let path = path.as_ref();
    let json = to_json(records)?;
    std::fs::write(path, json)?;
    debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<DetectionRecord>> {
    let path = path.as_ref();
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(BlueprintError::MalformedInput(format!(
                "intermediate file not found: {}",
                path.display()
            )));
        }
        Err(e) => return Err(e.into()),
    };
    let records = from_json(&text)?;
    debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}
