//! Schema catalog types used by the constraint subsystem.

mod column;
mod identifier;
mod table;
mod types;

pub use column::{ColumnKind, ColumnMetadata};
pub use identifier::ColumnIdentifier;
pub use table::{ColumnSnapshot, TableMetadata, TableSnapshot};
pub use types::{ColumnType, MarshalError, ScalarValue};
