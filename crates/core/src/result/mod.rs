pub mod cell;
pub mod decoder;
pub mod payload;
pub mod row;
#[cfg(feature = "tabular")]
pub mod table;
pub mod timestamp;

pub use cell::{Cell, CellValue};
pub use decoder::ResultDecoder;
pub use payload::{FieldDescriptor, ParsedResult, QueryResult, RawResult};
pub use row::Row;
#[cfg(feature = "tabular")]
pub use table::{Column, Table};
pub use timestamp::Timestamp;
