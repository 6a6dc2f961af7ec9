//! Record and response types shared by the store and the HTTP layer.
//!
//! Field names follow the JSON the voice-agent platform and the UI already speak (camelCase).

use chrono::{DateTime, NaiveDate, Utc};
use intake_ids::PrefixedId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

// ============================================================================
// Patient
// ============================================================================

/// Patient snapshot handed to the agent before or during a call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Patient {
    pub medical_id: String,
    pub name: String,
    /// Date of birth as `YYYY-MM-DD`; empty for placeholder records.
    pub dob: String,
    pub allergies: Vec<String>,
    pub last_visit: Option<NaiveDate>,
    pub notes: String,
}

impl Patient {
    /// Placeholder returned by the pre-call lookup when the caller is not in the directory.
    pub fn unknown(medical_id: impl Into<String>) -> Self {
        Self {
            medical_id: medical_id.into(),
            name: "Unknown".into(),
            dob: String::new(),
            allergies: Vec::new(),
            last_visit: None,
            notes: "No prior record".into(),
        }
    }
}

// ============================================================================
// Bot records
// ============================================================================

/// Schemaless bot configuration record.
///
/// Only `uid` and `createdAt` carry meaning to the backend; every other key is stored and
/// returned untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct BotRecord(Map<String, Value>);

impl BotRecord {
    pub const UID_KEY: &'static str = "uid";
    pub const CREATED_AT_KEY: &'static str = "createdAt";
    /// Keys that only the backend may write.
    pub const PROTECTED_KEYS: [&'static str; 2] = [Self::UID_KEY, Self::CREATED_AT_KEY];

    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The record's `uid`, when it is a string.
    pub fn uid(&self) -> Option<&str> {
        self.0.get(Self::UID_KEY).and_then(Value::as_str)
    }

    pub fn created_at(&self) -> Option<&str> {
        self.0.get(Self::CREATED_AT_KEY).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

}

impl From<Map<String, Value>> for BotRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

// ============================================================================
// Call logs
// ============================================================================

/// Marker for the `type` field of a function trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    FunctionCall,
}

/// Record of an in-call function lookup that found a patient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FunctionCallTrace {
    #[schema(value_type = String, example = "fc_1754386200123")]
    pub id: PrefixedId,
    #[serde(rename = "type")]
    pub kind: TraceKind,
    pub function: String,
    pub medical_id: String,
    pub result: Patient,
    #[serde(with = "crate::timestamp::iso_millis")]
    pub timestamp: DateTime<Utc>,
}

/// Post-call payload as received from the platform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PostCallReceipt {
    #[schema(value_type = String, example = "call_1754386200123")]
    pub id: PrefixedId,
    #[serde(with = "crate::timestamp::iso_millis")]
    pub received_at: DateTime<Utc>,
    #[schema(value_type = Object)]
    pub payload: Value,
}

/// Entry found in the backing file that matches neither known shape.
///
/// Kept verbatim so that a rewrite of the file does not drop it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct OpaqueEntry(pub Value);

/// One entry of the append-only call log.
///
/// An entry read back from the file is only typed when re-serialising it reproduces the stored
/// JSON exactly. Anything else (extra keys, a timestamp in another precision) stays `Opaque`,
/// so appending never rewrites older entries.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum CallLogEntry {
    FunctionCall(FunctionCallTrace),
    PostCall(PostCallReceipt),
    Opaque(OpaqueEntry),
}

impl CallLogEntry {
    /// Classify a stored entry, falling back to `Opaque` unless the typed form is lossless.
    pub fn from_value(value: Value) -> Self {
        if let Some(trace) = exact::<FunctionCallTrace>(&value) {
            return CallLogEntry::FunctionCall(trace);
        }
        if let Some(receipt) = exact::<PostCallReceipt>(&value) {
            return CallLogEntry::PostCall(receipt);
        }
        CallLogEntry::Opaque(OpaqueEntry(value))
    }

    /// The entry identifier, if the entry has one.
    pub fn id(&self) -> Option<String> {
        match self {
            CallLogEntry::FunctionCall(trace) => Some(trace.id.to_string()),
            CallLogEntry::PostCall(receipt) => Some(receipt.id.to_string()),
            CallLogEntry::Opaque(OpaqueEntry(value)) => {
                value.get("id").and_then(Value::as_str).map(str::to_owned)
            }
        }
    }
}

impl<'de> Deserialize<'de> for CallLogEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

fn exact<T>(value: &Value) -> Option<T>
where
    T: for<'de> Deserialize<'de> + Serialize,
{
    let typed = T::deserialize(value).ok()?;
    (serde_json::to_value(&typed).ok()? == *value).then_some(typed)
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
}

/// Plain acknowledgement, `{"ok": true}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AckRes {
    pub ok: bool,
}

impl AckRes {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PrecallRes {
    pub success: bool,
    pub patient: Patient,
}

/// Answer to the in-call `getPatient` function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum GetPatientRes {
    Found {
        ok: bool,
        data: Patient,
    },
    NotFound {
        ok: bool,
        error: String,
        #[serde(rename = "medicalId")]
        medical_id: String,
    },
}

impl GetPatientRes {
    pub fn found(patient: Patient) -> Self {
        GetPatientRes::Found {
            ok: true,
            data: patient,
        }
    }

    pub fn not_found(medical_id: impl Into<String>) -> Self {
        GetPatientRes::NotFound {
            ok: false,
            error: "Patient not found".into(),
            medical_id: medical_id.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PostCallRes {
    pub ok: bool,
    #[schema(value_type = String, example = "call_1754386200123")]
    pub id: PrefixedId,
}
