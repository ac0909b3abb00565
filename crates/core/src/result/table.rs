use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::result::cell::CellValue;
use crate::result::row::Row;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

/// Columnar view of a decoded result.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    /// A zero-row table with the given columns.
    pub fn empty<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns =
            names.into_iter().map(|name| Column { name: name.into(), values: Vec::new() }).collect();
        Self { columns, num_rows: 0 }
    }

    /// Columns are the union of row keys in encounter order; gaps are filled with nulls.
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut table = Self::default();

        for row in rows {
            for name in row.names() {
                if table.column_index(name).is_none() {
                    table.columns.push(Column {
                        name: name.to_string(),
                        values: vec![CellValue::Null; table.num_rows],
                    });
                }
            }

            for column in &mut table.columns {
                column.values.push(row.get(&column.name).cloned().unwrap_or(CellValue::Null));
            }
            table.num_rows += 1;
        }

        table
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|index| &self.columns[index])
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.column(column).and_then(|column| column.values.get(row))
    }

    pub fn is_null(&self, row: usize, column: &str) -> bool {
        self.value(row, column).map(CellValue::is_null).unwrap_or(false)
    }

    pub fn row(&self, index: usize) -> Option<Row> {
        if index >= self.num_rows {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|column| (column.name.clone(), column.values[index].clone()))
                .collect(),
        )
    }

    pub fn head(&self, limit: usize) -> Self {
        self.take_rows((0..self.num_rows.min(limit)).collect())
    }

    /// Stable sort on one column with nulls placed last in both directions.
    /// Returns `None` when the column does not exist.
    pub fn sort_by(&self, column: &str, ascending: bool) -> Option<Self> {
        let key = self.column(column)?;
        let mut order: Vec<usize> = (0..self.num_rows).collect();
        order.sort_by(|left, right| {
            let (left, right) = (&key.values[*left], &key.values[*right]);
            match (left.is_null(), right.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) if ascending => compare_values(left, right),
                (false, false) => compare_values(right, left),
            }
        });
        Some(self.take_rows(order))
    }

    fn take_rows(&self, order: Vec<usize>) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|column| Column {
                name: column.name.clone(),
                values: order.iter().map(|index| column.values[*index].clone()).collect(),
            })
            .collect();
        Self { columns, num_rows: order.len() }
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }
}

fn type_rank(value: &CellValue) -> u8 {
    match value {
        CellValue::Null => 0,
        CellValue::Bool(_) => 1,
        CellValue::Number(_) => 2,
        CellValue::Timestamp(_) => 3,
        CellValue::String(_) => 4,
        CellValue::List(_) => 5,
        CellValue::Json(_) => 6,
    }
}

fn compare_values(left: &CellValue, right: &CellValue) -> Ordering {
    match (left, right) {
        (CellValue::Bool(left), CellValue::Bool(right)) => left.cmp(right),
        (CellValue::Number(_), CellValue::Number(_)) => {
            let left = left.as_f64().unwrap_or(f64::NAN);
            let right = right.as_f64().unwrap_or(f64::NAN);
            left.partial_cmp(&right).unwrap_or(Ordering::Equal)
        }
        (CellValue::Timestamp(left), CellValue::Timestamp(right)) => {
            left.sort_key().cmp(&right.sort_key())
        }
        (CellValue::String(left), CellValue::String(right)) => left.cmp(right),
        _ => type_rank(left)
            .cmp(&type_rank(right))
            .then_with(|| left.to_string().cmp(&right.to_string())),
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return write!(f, "Empty table\nColumns: []\nRows: {}", self.num_rows);
        }

        let index_width = match self.num_rows {
            0 => 0,
            rows => (rows - 1).to_string().len(),
        };
        let cells: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|column| column.values.iter().map(ToString::to_string).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(&cells)
            .map(|(column, rendered)| {
                rendered
                    .iter()
                    .map(|text| text.chars().count())
                    .chain(std::iter::once(column.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:index_width$}", "")?;
        for (column, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:<width$}", column.name)?;
        }

        for row in 0..self.num_rows {
            writeln!(f)?;
            write!(f, "{row:<index_width$}")?;
            for (rendered, width) in cells.iter().zip(&widths) {
                write!(f, "  {:<width$}", rendered[row])?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Table;
    use crate::result::cell::CellValue;
    use crate::result::row::Row;

    fn rows() -> Vec<Row> {
        vec![
            [("name", CellValue::from("Alice")), ("count", CellValue::from(10))]
                .into_iter()
                .collect(),
            [("name", CellValue::from("Bob")), ("count", CellValue::Null)].into_iter().collect(),
            [("name", CellValue::from("Cara")), ("count", CellValue::from(30))]
                .into_iter()
                .collect(),
        ]
    }

    #[test]
    fn builds_columns_from_rows() {
        let table = Table::from_rows(&rows());

        assert_eq!(table.column_names(), vec!["name", "count"]);
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.value(2, "count"), Some(&CellValue::from(30)));
        assert!(table.is_null(1, "count"));
        assert!(!table.is_null(0, "count"));
    }

    #[test]
    fn late_columns_are_backfilled_with_nulls() {
        let first: Row = [("a", CellValue::from(1))].into_iter().collect();
        let second: Row =
            [("a", CellValue::from(2)), ("b", CellValue::from(3))].into_iter().collect();
        let third: Row = [("b", CellValue::from(4))].into_iter().collect();

        let table = Table::from_rows(&[first, second, third]);

        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert!(table.is_null(0, "b"));
        assert!(table.is_null(2, "a"));
        assert_eq!(table.value(1, "b"), Some(&CellValue::from(3)));
    }

    #[test]
    fn empty_table_keeps_declared_columns() {
        let table = Table::empty(["col1", "col2"]);
        assert_eq!(table.column_names(), vec!["col1", "col2"]);
        assert_eq!(table.num_rows(), 0);
        assert!(table.row(0).is_none());
    }

    #[test]
    fn sort_places_nulls_last() {
        let table = Table::from_rows(&rows());

        let descending = table.sort_by("count", false).expect("count column");
        let names: Vec<_> = (0..3)
            .filter_map(|row| descending.value(row, "name").and_then(CellValue::as_str))
            .collect();
        assert_eq!(names, vec!["Cara", "Alice", "Bob"]);

        let ascending = table.sort_by("count", true).expect("count column");
        assert_eq!(ascending.value(0, "name"), Some(&CellValue::from("Alice")));
        assert!(ascending.is_null(2, "count"));

        assert!(table.sort_by("missing", true).is_none());
    }

    #[test]
    fn head_limits_rows() {
        let table = Table::from_rows(&rows());
        assert_eq!(table.head(2).num_rows(), 2);
        assert_eq!(table.head(10).num_rows(), 3);
        assert_eq!(table.row(1), Some(rows()[1].clone()));
    }

    #[test]
    fn renders_aligned_grid() {
        let table = Table::from_rows(&rows()).head(2);
        let rendered = table.to_string();

        assert_eq!(rendered, "   name   count\n0  Alice  10   \n1  Bob    null ");
    }
}
