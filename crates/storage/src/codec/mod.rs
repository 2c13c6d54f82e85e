//! Field codecs.
//!
//! Structured semantic versions carry their payload as a "brittle" tuple:
//! a fixed number of statically typed fields whose layout is declared once
//! per assemblage by a [`FieldSchema`].
//!
//! # Usage
//!
//! ```
//! use chronicle_core::{FieldType, FieldValue, Nid};
//! use chronicle_storage::codec::{decode, encode, FieldSchema};
//!
//! let schema = FieldSchema::new(vec![FieldType::Nid, FieldType::Integer]);
//! let values = vec![FieldValue::Nid(Nid::new(4)), FieldValue::Integer(0)];
//!
//! let bytes = encode(&schema, &values).unwrap();
//! assert_eq!(decode(&bytes, &schema).unwrap(), values);
//! ```

mod brittle;

pub use brittle::{decode, encode, BrittleTuple, FieldSchema};
