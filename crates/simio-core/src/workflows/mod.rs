//! # Workflows Module
//!
//! Procedures that drive several handles at once through the engine.
//!
//! - **Transcoding** ([`transcode`]) - copy a known item layout from one file
//!   to another, converting between text, native and canonical encodings on the way.

pub mod transcode;
