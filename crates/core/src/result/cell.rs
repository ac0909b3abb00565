use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::result::timestamp::Timestamp;

pub const STRING_VALUE: &str = "string_value";
pub const NUMBER_VALUE: &str = "number_value";
pub const BOOL_VALUE: &str = "bool_value";
pub const NULL_VALUE: &str = "null_value";
pub const TIMESTAMP_VALUE: &str = "timestamp_value";
pub const DATE_VALUE: &str = "date_value";
pub const ARRAY_VALUE: &str = "array_value";
pub const RECORD_VALUE: &str = "record_value";

/// One tagged value on the wire. Exactly one tag is expected per cell; when several are
/// present the first in dispatch order wins.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    String(String),
    Number(Number),
    Bool(bool),
    Null,
    Timestamp(String),
    Date(String),
    Array(Vec<Cell>),
    Record(Vec<Cell>),
    /// A recognised tag whose payload has an unexpected JSON type. The payload is
    /// passed through as is.
    Mistyped { tag: &'static str, payload: Value },
    /// Cell without a recognised tag, carried verbatim.
    Unknown(Value),
}

/// A decoded cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Timestamp(Timestamp),
    List(Vec<CellValue>),
    Json(Value),
}

impl Cell {
    pub fn from_value(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self::Unknown(value);
        };
        Self::from_map(map)
    }

    fn from_map(mut map: Map<String, Value>) -> Self {
        let tag = [
            STRING_VALUE,
            NUMBER_VALUE,
            BOOL_VALUE,
            NULL_VALUE,
            TIMESTAMP_VALUE,
            DATE_VALUE,
            ARRAY_VALUE,
            RECORD_VALUE,
        ]
        .into_iter()
        .find(|tag| map.contains_key(*tag));

        let Some(tag) = tag else {
            return Self::Unknown(Value::Object(map));
        };
        if tag == NULL_VALUE {
            return Self::Null;
        }

        let payload = map.remove(tag).unwrap_or(Value::Null);
        match (tag, payload) {
            (_, Value::Null) => Self::Null,
            (STRING_VALUE, Value::String(text)) => Self::String(text),
            (NUMBER_VALUE, Value::Number(number)) => Self::Number(number),
            (BOOL_VALUE, Value::Bool(flag)) => Self::Bool(flag),
            (TIMESTAMP_VALUE, Value::String(literal)) => Self::Timestamp(literal),
            (DATE_VALUE, Value::String(literal)) => Self::Date(literal),
            (ARRAY_VALUE, Value::Array(items)) => {
                Self::Array(items.into_iter().map(Self::from_value).collect())
            }
            (RECORD_VALUE, Value::Array(items)) => {
                Self::Record(items.into_iter().map(Self::from_value).collect())
            }
            (tag, payload) => {
                debug!(
                    event_name = "result.cell.mistyped_payload",
                    tag, "cell payload passed through"
                );
                Self::Mistyped { tag, payload }
            }
        }
    }

    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Self::String(_) => Some(STRING_VALUE),
            Self::Number(_) => Some(NUMBER_VALUE),
            Self::Bool(_) => Some(BOOL_VALUE),
            Self::Null => Some(NULL_VALUE),
            Self::Timestamp(_) => Some(TIMESTAMP_VALUE),
            Self::Date(_) => Some(DATE_VALUE),
            Self::Array(_) => Some(ARRAY_VALUE),
            Self::Record(_) => Some(RECORD_VALUE),
            Self::Mistyped { tag, .. } => Some(*tag),
            Self::Unknown(_) => None,
        }
    }

    /// The single-key wire object for this cell.
    pub fn to_wire(&self) -> Value {
        let (tag, payload) = match self {
            Self::Unknown(raw) => return raw.clone(),
            Self::Mistyped { tag, payload } => (*tag, payload.clone()),
            Self::String(text) => (STRING_VALUE, Value::String(text.clone())),
            Self::Number(number) => (NUMBER_VALUE, Value::Number(number.clone())),
            Self::Bool(flag) => (BOOL_VALUE, Value::Bool(*flag)),
            Self::Null => (NULL_VALUE, Value::Null),
            Self::Timestamp(literal) => (TIMESTAMP_VALUE, Value::String(literal.clone())),
            Self::Date(literal) => (DATE_VALUE, Value::String(literal.clone())),
            Self::Array(items) => {
                (ARRAY_VALUE, Value::Array(items.iter().map(Self::to_wire).collect()))
            }
            Self::Record(items) => {
                (RECORD_VALUE, Value::Array(items.iter().map(Self::to_wire).collect()))
            }
        };

        let mut map = Map::new();
        map.insert(tag.to_string(), payload);
        Value::Object(map)
    }

    /// Decodes the cell. Timestamps become native values only when `parse_timestamps` is set.
    pub fn decode(&self, parse_timestamps: bool) -> CellValue {
        match self {
            Self::String(text) => CellValue::String(text.clone()),
            Self::Number(number) => CellValue::Number(number.clone()),
            Self::Bool(flag) => CellValue::Bool(*flag),
            Self::Null => CellValue::Null,
            Self::Timestamp(literal) => decode_timestamp(literal, parse_timestamps),
            Self::Date(literal) => CellValue::String(literal.clone()),
            // Nested records decode positionally like arrays; field names are not rebuilt.
            // Downstream consumers rely on the list shape, so this is kept as is.
            Self::Array(items) | Self::Record(items) => {
                CellValue::List(items.iter().map(|item| item.decode(parse_timestamps)).collect())
            }
            Self::Mistyped { payload, .. } => CellValue::from_json(payload.clone()),
            Self::Unknown(raw) => CellValue::Json(raw.clone()),
        }
    }
}

fn decode_timestamp(literal: &str, parse_timestamps: bool) -> CellValue {
    if !parse_timestamps {
        return CellValue::String(literal.to_string());
    }

    match Timestamp::parse(literal) {
        Some(timestamp) => CellValue::Timestamp(timestamp),
        None => {
            debug!(
                event_name = "result.cell.unparsed_timestamp",
                literal, "timestamp literal kept as text"
            );
            CellValue::String(literal.to_string())
        }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_wire().serialize(serializer)
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Wraps the value back into its wire cell.
    pub fn into_cell(self) -> Cell {
        match self {
            Self::Null => Cell::Null,
            Self::Bool(flag) => Cell::Bool(flag),
            Self::Number(number) => Cell::Number(number),
            Self::String(text) => Cell::String(text),
            Self::Timestamp(timestamp) => Cell::Timestamp(timestamp.to_literal()),
            Self::List(items) => Cell::Array(items.into_iter().map(Self::into_cell).collect()),
            Self::Json(raw) => Cell::from_value(raw),
        }
    }

    /// Plain JSON scalars map onto their native variants; anything else stays `Json`.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(flag),
            Value::Number(number) => Self::Number(number),
            Value::String(text) => Self::String(text),
            other => Self::Json(other),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) => number.as_f64(),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Number(number) => write!(f, "{number}"),
            Self::String(text) => f.write_str(text),
            Self::Timestamp(timestamp) => write!(f, "{timestamp}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Json(raw) => write!(f, "{raw}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Cell, CellValue};

    fn decode(raw: serde_json::Value) -> CellValue {
        Cell::from_value(raw).decode(false)
    }

    #[test]
    fn decodes_scalar_tags() {
        assert_eq!(decode(json!({"string_value": "test"})), CellValue::from("test"));
        assert_eq!(decode(json!({"number_value": 42})), CellValue::from(42));
        assert_eq!(decode(json!({"bool_value": true})), CellValue::Bool(true));
        assert_eq!(decode(json!({"null_value": null})), CellValue::Null);
        assert_eq!(decode(json!({"date_value": "2024-01-15"})), CellValue::from("2024-01-15"));
    }

    #[test]
    fn null_tag_ignores_its_payload() {
        assert_eq!(decode(json!({"null_value": true})), CellValue::Null);
    }

    #[test]
    fn floats_keep_their_representation() {
        let value = decode(json!({"number_value": 2.5}));
        assert_eq!(value.as_f64(), Some(2.5));
        assert_eq!(serde_json::to_value(&value).expect("serialize"), json!(2.5));
    }

    #[test]
    fn nested_array_decodes_recursively() {
        let value = decode(json!({"array_value": [
            {"string_value": "tag1"},
            {"string_value": "tag2"}
        ]}));
        assert_eq!(value, CellValue::List(vec!["tag1".into(), "tag2".into()]));
    }

    #[test]
    fn nested_record_decodes_like_an_array() {
        let value = decode(json!({"record_value": [
            {"string_value": "a"},
            {"number_value": 1}
        ]}));
        assert_eq!(serde_json::to_value(&value).expect("serialize"), json!(["a", 1]));
    }

    #[test]
    fn unknown_cell_is_returned_unchanged() {
        let raw = json!({"interval_value": "1 day"});
        assert_eq!(Cell::from_value(raw.clone()).tag(), None);
        assert_eq!(decode(raw.clone()), CellValue::Json(raw));
        assert_eq!(decode(json!("bare")), CellValue::Json(json!("bare")));
    }

    #[test]
    fn first_tag_in_dispatch_order_wins() {
        let cell = Cell::from_value(json!({"bool_value": false, "string_value": "wins"}));
        assert_eq!(cell.tag(), Some("string_value"));
        let value = cell.decode(false);
        assert_eq!(value, CellValue::from("wins"));
    }

    #[test]
    fn mistyped_payload_is_passed_through() {
        assert_eq!(decode(json!({"number_value": "12"})), CellValue::from("12"));
        assert_eq!(decode(json!({"string_value": 5})), CellValue::from(5));
        assert_eq!(
            decode(json!({"date_value": 1_705_276_800_000_i64})),
            CellValue::from(1_705_276_800_000_i64)
        );
        assert_eq!(decode(json!({"array_value": {"k": 1}})), CellValue::Json(json!({"k": 1})));

        let cell = Cell::from_value(json!({"bool_value": "yes"}));
        assert_eq!(cell.tag(), Some("bool_value"));
        assert_eq!(cell.to_wire(), json!({"bool_value": "yes"}));
    }

    #[test]
    fn timestamp_literal_is_raw_unless_parsing_requested() {
        let cell = Cell::from_value(json!({"timestamp_value": "2024-01-15T10:30:00Z"}));
        assert_eq!(cell.decode(false), CellValue::from("2024-01-15T10:30:00Z"));
        assert!(matches!(cell.decode(true), CellValue::Timestamp(_)));
    }

    #[test]
    fn unparseable_timestamp_falls_back_to_literal() {
        let cell = Cell::from_value(json!({"timestamp_value": "not a time"}));
        assert_eq!(cell.decode(true), CellValue::from("not a time"));
    }

    #[test]
    fn decoding_a_rewrapped_value_is_stable() {
        let cells = [
            json!({"string_value": "x"}),
            json!({"number_value": 3}),
            json!({"bool_value": false}),
            json!({"null_value": null}),
            json!({"array_value": [{"number_value": 1.5}, {"null_value": null}]}),
            json!({"timestamp_value": "2024-01-15T10:30:00Z"}),
        ];

        for raw in cells {
            for parse_timestamps in [false, true] {
                let decoded = Cell::from_value(raw.clone()).decode(parse_timestamps);
                let again = decoded.clone().into_cell().decode(parse_timestamps);
                assert_eq!(again, decoded, "cell {raw} should decode stably");
            }
        }
    }

    #[test]
    fn cells_serialize_to_wire_shape() {
        let cell = Cell::Array(vec![Cell::String("a".to_string()), Cell::Null]);
        assert_eq!(
            serde_json::to_value(&cell).expect("serialize"),
            json!({"array_value": [{"string_value": "a"}, {"null_value": null}]})
        );
    }
}
