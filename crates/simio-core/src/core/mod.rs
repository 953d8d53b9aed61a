//! # Core Module
//!
//! Stateless building blocks of the record I/O layer: value types, the file-type
//! table, item descriptions, the stream wrapper and the three wire codecs.
//!
//! ## Architecture
//!
//! - **Value Types** ([`types`]) - reals, vectors, step counters and on-disk precision
//! - **File Types** ([`filetype`]) - extension table mapping paths to a [`filetype::FormatCategory`]
//! - **Items** ([`item`]) - the semantic kinds that can be transferred and their multiplicity rules
//! - **Streams** ([`stream`]) - the owned file or standard stream behind one handle
//! - **Codecs** ([`codec`]) - text, native-binary and canonical-binary encoders/decoders
//!
//! Nothing in this module keeps state between calls; handle bookkeeping lives in
//! [`crate::engine`].

pub mod codec;
pub mod filetype;
pub mod item;
pub mod stream;
pub mod types;
