// Telemetry rewriter
// Rotates machineId / devDeviceId in the editor's storage.json under the backup/restore guard.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{DEVICE_ID_FIELD, JSON_INDENT, MACHINE_ID_FIELD, TELEMETRY_OBJECT};
use crate::error::Result;
use crate::events::EventSink;
use crate::ids::IdentifierPair;
use crate::transaction::{self, OperationReport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteOutcome {
    pub identifiers: IdentifierPair,
    /// Dotted paths of the fields that were overwritten, in file order of checks.
    pub updated_fields: Vec<String>,
}

impl RewriteOutcome {
    pub fn modified(&self) -> bool {
        !self.updated_fields.is_empty()
    }
}

/// Rewrite the telemetry identifiers in `storage_path` with a freshly generated pair.
pub fn rewrite_telemetry_ids(storage_path: &Path, sink: &dyn EventSink) -> OperationReport<RewriteOutcome> {
    rewrite(storage_path, IdentifierPair::generate, write_pretty, sink)
}

/// Same as [`rewrite_telemetry_ids`] with a caller-chosen identifier pair.
pub fn rewrite_telemetry_ids_with(
    storage_path: &Path,
    identifiers: IdentifierPair,
    sink: &dyn EventSink,
) -> OperationReport<RewriteOutcome> {
    rewrite(storage_path, move || identifiers, write_pretty, sink)
}

fn rewrite<G, W>(storage_path: &Path, generate: G, write: W, sink: &dyn EventSink) -> OperationReport<RewriteOutcome>
where
    G: FnOnce() -> IdentifierPair,
    W: FnOnce(&Path, &Value) -> Result<()>,
{
    let intro = [format!("Attempting to modify telemetry IDs in: {}", storage_path.display())];
    transaction::run_guarded(storage_path, "Storage file", &intro, sink, |events| {
        let identifiers = generate();
        events.info(&format!("Generated new machineId: {}", identifiers.machine_id));
        events.info(&format!("Generated new devDeviceId: {}", identifiers.device_id));

        let bytes = fs::read(storage_path)?;
        let mut data: Value = serde_json::from_slice(&bytes)?;

        let updated_fields = apply_identifiers(&mut data, &identifiers)?;
        for field in &updated_fields {
            events.info(&format!("Updated {}.", field));
        }

        if updated_fields.is_empty() {
            events.info("No relevant telemetry IDs found or IDs already match new ones. No changes made to content.");
            return Ok(RewriteOutcome {
                identifiers,
                updated_fields,
            });
        }

        write(storage_path, &data)?;
        events.success(&format!(
            "Successfully modified telemetry IDs in {}.",
            storage_path.display()
        ));

        Ok(RewriteOutcome {
            identifiers,
            updated_fields,
        })
    })
}

/// Overwrite the identifier fields that exist and differ. Never creates fields.
/// Both machineId locations receive the same value.
pub fn apply_identifiers(data: &mut Value, identifiers: &IdentifierPair) -> Result<Vec<String>> {
    let root = data.as_object_mut().ok_or_else(|| {
        <serde_json::Error as serde::de::Error>::custom("storage file is not a JSON object")
    })?;

    let mut updated = Vec::new();

    if replace_if_present(root, MACHINE_ID_FIELD, &identifiers.machine_id) {
        updated.push(MACHINE_ID_FIELD.to_string());
    }

    if let Some(Value::Object(telemetry)) = root.get_mut(TELEMETRY_OBJECT) {
        if replace_if_present(telemetry, MACHINE_ID_FIELD, &identifiers.machine_id) {
            updated.push(format!("{}.{}", TELEMETRY_OBJECT, MACHINE_ID_FIELD));
        }
        if replace_if_present(telemetry, DEVICE_ID_FIELD, &identifiers.device_id) {
            updated.push(format!("{}.{}", TELEMETRY_OBJECT, DEVICE_ID_FIELD));
        }
    }

    Ok(updated)
}

fn replace_if_present(object: &mut Map<String, Value>, field: &str, new_value: &str) -> bool {
    match object.get_mut(field) {
        Some(current) if current.as_str() != Some(new_value) => {
            *current = Value::String(new_value.to_string());
            true
        }
        _ => false,
    }
}

/// Human-editable output: 4-space indent, original key order.
fn write_pretty(path: &Path, data: &Value) -> Result<()> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    data.serialize(&mut serializer)?;

    let mut file = fs::File::create(path)?;
    file.write_all(&buffer)?;
    file.sync_all()?;
    Ok(())
}
