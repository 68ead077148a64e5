//! # Meeting Record
//! Typed view over a single TSML feed entry.
//!
//! The feed has no fixed schema: any field may be missing, `null`, or carry a
//! different JSON type than usual (`"day": "2"`, `"latitude": "47.6"`). Decoding
//! is therefore lenient: an unusable value becomes "absent" instead of failing the
//! whole record. Keys we do not model are kept in [`MeetingRecord::extra`] so
//! exports can re-emit them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingRecord {
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Weekday, 0 = Sunday .. 6 = Saturday.
    #[serde(default, deserialize_with = "loose_day", skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
    /// Sortable start time, usually 24h `HH:MM`.
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub time_formatted: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub conference_url: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub attendance_option: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub location_notes: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "loose_types", skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, deserialize_with = "loose_f64", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Everything else the feed sent along.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `Some` only for present, non-empty strings.
#[inline]
fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

impl MeetingRecord {
    /// Decode one feed element. Only JSON objects are records.
    pub fn from_value(value: Value) -> anyhow::Result<Self> {
        if !value.is_object() {
            anyhow::bail!("feed entry is not an object");
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn address(&self) -> Option<&str> {
        non_empty(&self.formatted_address)
    }

    pub fn conference(&self) -> Option<&str> {
        non_empty(&self.conference_url)
    }

    pub fn explicit_attendance(&self) -> Option<&str> {
        non_empty(&self.attendance_option)
    }

    pub fn region_name(&self) -> Option<&str> {
        non_empty(&self.region)
    }

    pub fn has_address(&self) -> bool {
        self.address().is_some()
    }

    pub fn has_conference(&self) -> bool {
        self.conference().is_some()
    }

    /// Raw time string used for ordering; missing sorts first.
    pub fn time_key(&self) -> &str {
        self.time.as_deref().unwrap_or("")
    }

    /// Human readable time: `time_formatted` when the feed has it, raw `time` otherwise.
    pub fn display_time(&self) -> &str {
        non_empty(&self.time_formatted).unwrap_or_else(|| self.time_key())
    }

    pub fn display_name(&self) -> &str {
        non_empty(&self.name).unwrap_or("Unnamed Meeting")
    }
}

fn loose_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn loose_day<'de, D>(d: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|x| u8::try_from(x).ok()),
        Value::String(s) => s.trim().parse::<u8>().ok(),
        _ => None,
    })
}

fn loose_types<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) if !s.is_empty() => vec![s],
        _ => Vec::new(),
    })
}

fn loose_f64<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
