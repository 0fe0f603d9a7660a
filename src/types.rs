//! Core types for the cube store.

use crate::error::{Result, StoreError};
use chrono::{Local, SecondsFormat};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Name of a cube type in the catalog (e.g. "3x3", "Skewb").
pub type CubeName = String;

/// Opaque best-time record, stored and returned verbatim.
pub type RecordValue = Value;

/// Best-time records keyed by cube name, in insertion order.
pub type RecordMap = Map<String, RecordValue>;

/// Unique identifier for a solve time.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct TimeId(pub u64);

impl TimeId {
    pub fn next(self) -> Self {
        TimeId(self.0 + 1)
    }
}

impl fmt::Debug for TimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeId({})", self.0)
    }
}

impl fmt::Display for TimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current local time as an ISO-8601 string with microsecond precision.
pub fn now_iso8601() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Keys of a time entry owned by the store. They never live in an
/// attribute bag.
pub const RESERVED_KEYS: [&str; 3] = ["id", "cube", "timestamp"];

fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// One recorded solve attempt.
///
/// `id`, `cube` and `timestamp` are owned by the store; everything else the
/// caller sent (duration, scramble, penalty...) lives in `attributes` and is
/// written back untouched.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TimeEntry {
    pub id: TimeId,

    #[serde(default)]
    pub cube: Option<CubeName>,

    /// Empty when an older document stored no timestamp (or `null`).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub timestamp: String,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// Written by hand so an attribute named like a store-owned field can never
// produce a duplicate key in the document.
impl Serialize for TimeEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let extra = self.attributes.iter().filter(|(k, _)| !is_reserved(k));
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("cube", &self.cube)?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        for (key, value) in extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl TimeEntry {
    /// Whether this entry is tagged with the given cube.
    pub fn is_cube(&self, name: &str) -> bool {
        self.cube.as_deref() == Some(name)
    }

    /// Look up a caller-supplied attribute.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// Input for creating a new solve time (before id assigned).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewTime {
    pub cube: Option<CubeName>,
    pub timestamp: Option<String>,
    pub attributes: Map<String, Value>,
}

impl NewTime {
    /// Create an input tagged with a cube.
    pub fn for_cube(cube: impl Into<CubeName>) -> Self {
        Self {
            cube: Some(cube.into()),
            ..Default::default()
        }
    }

    /// Set an explicit timestamp instead of the creation instant.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Add a free-form attribute. Store-owned keys (`id`, `cube`,
    /// `timestamp`) are refused when the input is added.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Build an input from an untyped request body.
    ///
    /// Any `id` in the payload is discarded; the store always assigns ids.
    pub fn from_json(payload: Value) -> Result<Self> {
        let mut object = match payload {
            Value::Object(object) => object,
            other => {
                return Err(StoreError::InvalidPayload(format!(
                    "time payload must be an object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        object.remove("id");

        let cube = match object.remove("cube") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name),
            Some(other) => {
                return Err(StoreError::InvalidPayload(format!(
                    "`cube` must be a string or null, got {}",
                    json_type_name(&other)
                )))
            }
        };

        let timestamp = match object.remove("timestamp") {
            None | Some(Value::Null) => None,
            Some(Value::String(ts)) => Some(ts),
            Some(other) => {
                return Err(StoreError::InvalidPayload(format!(
                    "`timestamp` must be a string, got {}",
                    json_type_name(&other)
                )))
            }
        };

        Ok(Self {
            cube,
            timestamp,
            attributes: object,
        })
    }

    /// Fail if the attribute bag carries a store-owned key.
    pub fn validate(&self) -> Result<()> {
        match self.attributes.keys().find(|k| is_reserved(k)) {
            Some(key) => Err(StoreError::InvalidPayload(format!(
                "`{key}` is set by the store and cannot be passed as an attribute"
            ))),
            None => Ok(()),
        }
    }

    /// Turn the input into a stored entry, stamping it with now if no
    /// timestamp was given. Store-owned keys left in the attribute bag are
    /// dropped.
    pub fn into_entry(self, id: TimeId) -> TimeEntry {
        let mut attributes = self.attributes;
        attributes.retain(|k, _| !is_reserved(k));
        TimeEntry {
            id,
            cube: self.cube,
            timestamp: self.timestamp.unwrap_or_else(now_iso8601),
            attributes,
        }
    }
}

/// The single persisted document holding all three collections.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub times: Vec<TimeEntry>,

    pub records: RecordMap,

    pub cubes: Vec<CubeName>,

    /// Highest id ever handed out. Never decreases, so deleted ids stay retired.
    #[serde(default, rename = "lastId")]
    pub last_id: u64,
}

impl Document {
    /// An empty document seeded with a starter catalog.
    pub fn with_cubes<I, S>(cubes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CubeName>,
    {
        Self {
            cubes: cubes.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Reserve the next time id.
    pub fn allocate_time_id(&mut self) -> TimeId {
        let max_existing = self.times.iter().map(|t| t.id.0).max().unwrap_or(0);
        let id = TimeId(max_existing.max(self.last_id)).next();
        self.last_id = id.0;
        id
    }

    pub fn has_cube(&self, name: &str) -> bool {
        self.cubes.iter().any(|c| c == name)
    }
}

/// Reject empty or whitespace-only cube names.
pub(crate) fn validate_cube_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidPayload(
            "cube name must not be empty".into(),
        ));
    }
    Ok(())
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
