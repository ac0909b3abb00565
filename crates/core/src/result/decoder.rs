use tracing::debug;

use crate::capability::Capabilities;
use crate::errors::DecodeError;
use crate::result::payload::{FieldDescriptor, ParsedResult, QueryResult};
use crate::result::row::Row;
#[cfg(feature = "tabular")]
use crate::result::table::Table;

/// Converts publisher query results into rows, tables or the bare schema.
///
/// The decoder holds no mutable state and can be shared freely across threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResultDecoder {
    capabilities: Capabilities,
}

impl ResultDecoder {
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }

    pub fn detect() -> Self {
        Self::new(Capabilities::detect())
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// One row per data row carrying a `record_value`; timestamps stay raw literals.
    pub fn decode_to_rows(&self, query_result: &QueryResult) -> Result<Vec<Row>, DecodeError> {
        let parsed = query_result.raw()?.parse()?;
        materialize(&parsed, false)
    }

    /// Columnar decoding; timestamps become native values when that capability is on.
    #[cfg(feature = "tabular")]
    pub fn decode_to_table(&self, query_result: &QueryResult) -> Result<Table, DecodeError> {
        self.capabilities.require_tabular()?;

        let parsed = query_result.raw()?.parse()?;
        let field_names = parsed.field_names()?;
        if parsed.rows().map_or(true, |rows| rows.is_empty()) {
            return Ok(Table::empty(field_names));
        }

        let rows = materialize(&parsed, self.capabilities.timestamps)?;
        Ok(Table::from_rows(&rows))
    }

    pub fn decode_schema(
        &self,
        query_result: &QueryResult,
    ) -> Result<Vec<FieldDescriptor>, DecodeError> {
        let parsed = query_result.raw()?.parse()?;
        Ok(parsed.fields()?.to_vec())
    }
}

fn materialize(parsed: &ParsedResult, parse_timestamps: bool) -> Result<Vec<Row>, DecodeError> {
    let field_names = parsed.field_names()?;
    let Some(envelopes) = parsed.rows() else {
        return Ok(Vec::new());
    };

    let mut rows = Vec::with_capacity(envelopes.len());
    let mut skipped = 0usize;
    for envelope in envelopes {
        let Some(record) = &envelope.record_value else {
            skipped += 1;
            continue;
        };

        // Bounded zip: extra cells are dropped and unmatched trailing fields stay absent.
        let row = field_names
            .iter()
            .zip(record)
            .map(|(name, cell)| (*name, cell.decode(parse_timestamps)))
            .collect::<Row>();
        rows.push(row);
    }

    debug!(
        event_name = "result.decode.materialized",
        fields = field_names.len(),
        rows = rows.len(),
        skipped,
        "decoded query result rows"
    );
    Ok(rows)
}
