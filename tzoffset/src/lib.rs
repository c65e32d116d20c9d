//! Offset-preserving timestamp fields for document schemas.
//!
//! Storing a timestamp as an absolute instant loses the wall clock it was
//! recorded on. [`install`] rewrites each timestamp field `p` of a [`Schema`]
//! into a stored pair, `p_utc` and `p_offset` (hours), plus a computed field at
//! `p` that reads back as a `DateTime<FixedOffset>` at the original offset.
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use tzoffset::{Document, OffsetOptions, Schema, install, types::FieldType};
//!
//! let mut schema = Schema::new()
//!     .field("name", FieldType::String)?
//!     .field("when.created", FieldType::DateTime)?;
//! install(&mut schema, &OffsetOptions::default())?;
//!
//! let doc = Document::from_value(
//!     Arc::new(schema),
//!     json!({"name": "launch", "when": {"created": "2018-04-20T13:30:00+02:00"}}),
//! )?;
//! assert_eq!(doc.lean()["when"]["created_utc"], json!("2018-04-20T11:30:00Z"));
//! assert_eq!(doc.lean()["when"]["created_offset"], json!(2));
//! assert_eq!(doc.get("when.created")?, json!("2018-04-20T13:30:00+02:00"));
//! # Ok::<(), tzoffset::SchemaError>(())
//! ```

pub mod accessor;
pub mod config;
pub mod document;
pub mod errors;
pub mod path;
pub mod plugin;
pub mod schema;
pub mod types;

pub use accessor::{ComputedAccessor, OffsetAccessor, OffsetPolicy, describe_offset, is_plausible_offset};
pub use config::OffsetConfig;
pub use document::Document;
pub use errors::*;
pub use plugin::{OffsetOptions, install, rewrite, select_fields};
pub use schema::{ComputedField, Schema};
pub use types::{FieldDescriptor, FieldType, SerializationConfig, SerializeOptions};
