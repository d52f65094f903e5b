//! Client-side type registry for the **PostgreSQL** wire protocol.
//!
//! The registry turns raw rows from the server's system catalog (`pg_type`,
//! `pg_attribute`, `pg_proc`) into a graph of [`PgType`] descriptors and binds,
//! for every type, the codecs used to read and write its values in the binary
//! and text wire formats.
//!
//! ```rust
//! use pgtype_registry::{CodecTable, Oid, PgTypeRegistry, PgTypeRow, PgAttributeRow};
//!
//! let mut registry = PgTypeRegistry::new(CodecTable::new());
//!
//! registry.ingest(
//!     [PgTypeRow {
//!         oid: Oid(100),
//!         name: "pair".into(),
//!         typtype: 'c',
//!         relation: Oid(100),
//!         ..PgTypeRow::default()
//!     }],
//!     [
//!         PgAttributeRow::new(Oid(100), "a", Oid(23), 1),
//!         PgAttributeRow::new(Oid(100), "b", Oid(21), 2),
//!     ],
//!     [],
//! )?;
//!
//! let pair = registry.get(Oid(100)).expect("resolved during ingest");
//! let names: Vec<&str> = pair.fields().map(|(name, _)| name).collect();
//! assert_eq!(names, ["a", "b"]);
//! # Ok::<(), pgtype_registry::Error>(())
//! ```
#![forbid(unsafe_code)]
#![warn(future_incompatible, rust_2018_idioms, missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
pub mod error;

#[macro_use]
mod logger;

mod builtin;
pub mod catalog;
pub mod codec;
mod ext;
mod oid;
pub mod options;
pub mod registry;
mod sync;
mod type_info;

pub(crate) use ahash::{AHashMap as HashMap, AHashSet as HashSet};

#[doc(inline)]
pub use self::{
    builtin::PgBootstrapType,
    catalog::{CatalogBatch, CatalogRowStore, PgAttributeRow, PgProcRow, PgTypeRow},
    codec::{CodecDirection, CodecLookup, CodecTable, PgCodec, PgCodecPair, PgValueFormat},
    error::{BoxDynError, Error, Result},
    ext::ustr::UStr,
    oid::Oid,
    options::PgTypeRegistryOptions,
    registry::{PgLiveType, PgTypeRegistry},
    sync::SharedPgTypeRegistry,
    type_info::{PgDomain, PgType, PgTypeDeps, PgTypeKind, TypCategory, TypType},
};
