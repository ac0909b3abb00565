use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::DecodeError;
use crate::result::cell::Cell;

/// The value handed over by the query transport.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub result: Option<RawResult>,
}

/// The `result` attribute: serialized JSON text or an already parsed document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawResult {
    Text(String),
    Parsed(Value),
}

impl QueryResult {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { result: Some(RawResult::Text(text.into())) }
    }

    pub fn from_parsed(parsed: Value) -> Self {
        Self { result: Some(RawResult::Parsed(parsed)) }
    }

    /// Reads a publisher response envelope (`{"result": ...}`). Anything without a
    /// non-null `result` member yields an empty `QueryResult`.
    pub fn from_envelope(envelope: Value) -> Self {
        let Value::Object(mut members) = envelope else {
            return Self::default();
        };

        let result = match members.remove("result") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(RawResult::Text(text)),
            Some(parsed) => Some(RawResult::Parsed(parsed)),
        };
        Self { result }
    }

    pub fn raw(&self) -> Result<&RawResult, DecodeError> {
        self.result.as_ref().ok_or(DecodeError::InvalidInputShape)
    }
}

impl From<String> for QueryResult {
    fn from(value: String) -> Self {
        Self::from_text(value)
    }
}

impl From<&str> for QueryResult {
    fn from(value: &str) -> Self {
        Self::from_text(value)
    }
}

impl From<Value> for QueryResult {
    fn from(value: Value) -> Self {
        Self::from_parsed(value)
    }
}

impl RawResult {
    pub fn parse(&self) -> Result<ParsedResult, DecodeError> {
        let document = match self {
            Self::Text(text) => serde_json::from_str::<Value>(text)?,
            Self::Parsed(parsed) => parsed.clone(),
        };

        if !document.is_object() {
            return Err(DecodeError::malformed("expected a JSON object at the top level"));
        }
        Ok(serde_json::from_value(document)?)
    }
}

/// Schema plus data, as produced by the publisher.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedResult {
    #[serde(default)]
    pub schema: Option<ResultSchema>,
    #[serde(default)]
    pub data: Option<ResultData>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSchema {
    #[serde(default)]
    pub fields: Option<Vec<FieldDescriptor>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    /// Kept as published: a plain name or a structured type object.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultData {
    #[serde(default)]
    pub array_value: Option<Vec<RowEnvelope>>,
}

/// One entry of `data.array_value`. Entries that are not objects, or that carry no
/// `record_value`, have no record and are skipped by the decoder.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RowEnvelope {
    pub record_value: Option<Vec<Cell>>,
}

impl<'de> Deserialize<'de> for RowEnvelope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record_value = match Value::deserialize(deserializer)? {
            Value::Object(mut members) => match members.remove("record_value") {
                None | Some(Value::Null) => None,
                Some(Value::Array(cells)) => {
                    Some(cells.into_iter().map(Cell::from_value).collect())
                }
                // A record with an unusable payload still counts as a row, just an empty one.
                Some(_) => Some(Vec::new()),
            },
            _ => None,
        };
        Ok(Self { record_value })
    }
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.map(|name| Value::String(name.to_string())),
            extra: Map::new(),
        }
    }

    /// The type name, or the `kind` of a structured type, else `"unknown"`.
    pub fn type_or_unknown(&self) -> &str {
        match &self.field_type {
            Some(Value::String(name)) => name,
            Some(Value::Object(members)) => {
                members.get("kind").and_then(Value::as_str).unwrap_or("unknown")
            }
            _ => "unknown",
        }
    }
}

impl ParsedResult {
    pub fn fields(&self) -> Result<&[FieldDescriptor], DecodeError> {
        self.schema
            .as_ref()
            .and_then(|schema| schema.fields.as_deref())
            .ok_or(DecodeError::MissingSchema)
    }

    pub fn field_names(&self) -> Result<Vec<&str>, DecodeError> {
        Ok(self.fields()?.iter().map(|field| field.name.as_str()).collect())
    }

    /// `None` when `data` or `data.array_value` is absent.
    pub fn rows(&self) -> Option<&[RowEnvelope]> {
        self.data.as_ref().and_then(|data| data.array_value.as_deref())
    }
}
