//! Data model for field schemas compiled into spreadsheet validation.

pub mod enums;
pub mod literal;
pub mod node;

pub use enums::{FieldType, MissingValue, ValidationKey};
pub use literal::Literal;
pub use node::{FieldSchemas, SchemaNode};
