//! Binding of catalog procedures to wire codecs.
//!
//! The registry only knows procedure *names* (`int4send`, `array_in`, `record_recv`, ...).
//! Which implementation backs a name is decided entirely by a [`CodecLookup`] supplied by
//! the owner of the registry, so new wire formats and codecs can be added without touching
//! type resolution.

use std::any::{type_name, Any};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::ext::ustr::UStr;
use crate::HashMap;

/// The wire format of a value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum PgValueFormat {
    /// Human-readable text representation (`typinput` / `typoutput`).
    Text = 0,
    /// Type-specific packed representation (`typreceive` / `typsend`).
    Binary = 1,
}

/// Whether a codec writes values to the server or reads values sent by it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CodecDirection {
    /// Rust value to wire bytes, consumed by the server's `input`/`receive` procedure.
    Encode,
    /// Wire bytes to Rust value, produced by the server's `output`/`send` procedure.
    Decode,
}

/// An opaque, cheaply clonable handle to a codec implementation.
///
/// The registry never calls into a codec; it only carries the handle from the
/// [`CodecLookup`] to the [`PgType`](crate::PgType) that uses it. Consumers recover the
/// concrete implementation with [`downcast_ref`](PgCodec::downcast_ref).
#[derive(Clone)]
pub struct PgCodec {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl PgCodec {
    /// Wrap a codec implementation.
    pub fn new<T: Any + Send + Sync>(codec: T) -> Self {
        Self {
            inner: Arc::new(codec),
            type_name: type_name::<T>(),
        }
    }

    /// Borrow the implementation if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    /// Returns `true` if both handles point to the same implementation.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }
}

impl Debug for PgCodec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PgCodec").field(&self.type_name).finish()
    }
}

/// The codecs of a type for one wire format.
///
/// Either half may be absent: that means the format is unsupported in that direction for
/// the type and the caller must fall back to another path (usually text), it is not an
/// error.
#[derive(Debug, Clone, Default)]
pub struct PgCodecPair {
    /// Reads values sent by the server.
    pub decoder: Option<PgCodec>,
    /// Writes values for the server.
    pub encoder: Option<PgCodec>,
}

impl PgCodecPair {
    /// A pair with both halves absent.
    pub const fn none() -> Self {
        Self {
            decoder: None,
            encoder: None,
        }
    }

    /// Returns `true` if neither half is present.
    pub fn is_empty(&self) -> bool {
        self.decoder.is_none() && self.encoder.is_none()
    }

    /// Fill every absent half of `self` from `fallback`.
    pub fn or(self, fallback: &PgCodecPair) -> PgCodecPair {
        PgCodecPair {
            decoder: self.decoder.or_else(|| fallback.decoder.clone()),
            encoder: self.encoder.or_else(|| fallback.encoder.clone()),
        }
    }
}

/// Resolves a catalog procedure name to a codec.
///
/// Implementations are expected to be pure in-memory lookups: the registry calls them while
/// resolving types and holds no timeout or cancellation around the call.
pub trait CodecLookup: Send + Sync + 'static {
    /// Find the codec implementing `proc_name` in the given direction and format.
    fn find(
        &self,
        proc_name: &str,
        direction: CodecDirection,
        format: PgValueFormat,
    ) -> Option<PgCodec>;
}

impl<F> CodecLookup for F
where
    F: Fn(&str, CodecDirection, PgValueFormat) -> Option<PgCodec> + Send + Sync + 'static,
{
    fn find(
        &self,
        proc_name: &str,
        direction: CodecDirection,
        format: PgValueFormat,
    ) -> Option<PgCodec> {
        self(proc_name, direction, format)
    }
}

/// An in-memory [`CodecLookup`] keyed by procedure name.
#[derive(Debug, Clone, Default)]
pub struct CodecTable {
    // indexed by `slot(direction, format)`
    procs: HashMap<UStr, [Option<PgCodec>; 4]>,
}

const fn slot(direction: CodecDirection, format: PgValueFormat) -> usize {
    match (direction, format) {
        (CodecDirection::Encode, PgValueFormat::Text) => 0,
        (CodecDirection::Encode, PgValueFormat::Binary) => 1,
        (CodecDirection::Decode, PgValueFormat::Text) => 2,
        (CodecDirection::Decode, PgValueFormat::Binary) => 3,
    }
}

impl CodecTable {
    /// Create an empty table. Every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `codec` for `proc_name` in one direction and format, replacing any codec
    /// previously registered there.
    pub fn insert(
        &mut self,
        proc_name: impl Into<UStr>,
        direction: CodecDirection,
        format: PgValueFormat,
        codec: PgCodec,
    ) -> &mut Self {
        self.procs.entry(proc_name.into()).or_default()[slot(direction, format)] = Some(codec);
        self
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with(
        mut self,
        proc_name: impl Into<UStr>,
        direction: CodecDirection,
        format: PgValueFormat,
        codec: PgCodec,
    ) -> Self {
        self.insert(proc_name, direction, format, codec);
        self
    }

    /// Number of distinct procedure names with at least one codec.
    pub fn len(&self) -> usize {
        self.procs.len()
    }

    /// Returns `true` if no codec is registered.
    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }
}

impl CodecLookup for CodecTable {
    fn find(
        &self,
        proc_name: &str,
        direction: CodecDirection,
        format: PgValueFormat,
    ) -> Option<PgCodec> {
        self.procs.get(proc_name)?[slot(direction, format)].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Int4Send;

    #[test]
    fn table_is_keyed_by_direction_and_format() {
        let table = CodecTable::new().with(
            "int4send",
            CodecDirection::Decode,
            PgValueFormat::Binary,
            PgCodec::new(Int4Send),
        );

        let codec = table
            .find("int4send", CodecDirection::Decode, PgValueFormat::Binary)
            .unwrap();
        assert_eq!(codec.downcast_ref::<Int4Send>(), Some(&Int4Send));
        assert!(codec.downcast_ref::<u32>().is_none());

        assert!(table
            .find("int4send", CodecDirection::Encode, PgValueFormat::Binary)
            .is_none());
        assert!(table
            .find("int4send", CodecDirection::Decode, PgValueFormat::Text)
            .is_none());
        assert!(table
            .find("int4recv", CodecDirection::Decode, PgValueFormat::Binary)
            .is_none());
    }

    #[test]
    fn closures_are_lookups() {
        let shared = PgCodec::new(Int4Send);
        let expected = shared.clone();

        let lookup = move |name: &str, _: CodecDirection, _: PgValueFormat| {
            (name == "int4send").then(|| shared.clone())
        };

        let found = lookup
            .find("int4send", CodecDirection::Decode, PgValueFormat::Binary)
            .unwrap();
        assert!(PgCodec::ptr_eq(&found, &expected));
        assert!(lookup
            .find("textsend", CodecDirection::Decode, PgValueFormat::Binary)
            .is_none());
    }

    #[test]
    fn pair_falls_back_per_half() {
        let own = PgCodec::new(Int4Send);
        let base = PgCodec::new(Int4Send);

        let pair = PgCodecPair {
            decoder: Some(own.clone()),
            encoder: None,
        }
        .or(&PgCodecPair {
            decoder: Some(base.clone()),
            encoder: Some(base.clone()),
        });

        assert!(PgCodec::ptr_eq(pair.decoder.as_ref().unwrap(), &own));
        assert!(PgCodec::ptr_eq(pair.encoder.as_ref().unwrap(), &base));
        assert!(PgCodecPair::none().is_empty());
    }
}
