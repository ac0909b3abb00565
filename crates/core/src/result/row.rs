use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::result::cell::CellValue;

/// One decoded result row: field names in schema order mapped to values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value. A repeated name overwrites the earlier value and keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: CellValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.entries.iter().find(|(existing, _)| existing == name).map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<N, V> FromIterator<(N, V)> for Row
where
    N: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.insert(name, value.into());
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::Row;
    use crate::result::cell::CellValue;

    #[test]
    fn duplicate_names_overwrite_in_place() {
        let mut row = Row::new();
        row.insert("a", CellValue::from(1));
        row.insert("b", CellValue::from(2));
        row.insert("a", CellValue::from(3));

        assert_eq!(row.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(row.get("a"), Some(&CellValue::from(3)));
    }

    #[test]
    fn serializes_in_insertion_order() {
        let row: Row = [("zeta", CellValue::from("z")), ("alpha", CellValue::Null)]
            .into_iter()
            .collect();

        let text = serde_json::to_string(&row).expect("serialize");
        assert_eq!(text, r#"{"zeta":"z","alpha":null}"#);
    }
}
