pub mod capability;
pub mod config;
pub mod errors;
pub mod result;

pub use capability::Capabilities;
pub use errors::DecodeError;
pub use result::{
    Cell, CellValue, FieldDescriptor, ParsedResult, QueryResult, RawResult, ResultDecoder, Row,
    Timestamp,
};
#[cfg(feature = "tabular")]
pub use result::{Column, Table};
