//! # Engine Module
//!
//! The stateful half of the library: which files are open, how each one is
//! encoded, where its cursor sits and what happens to an old file before it
//! is overwritten.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - defaults for new handles, loaded from TOML
//! - **Error Handling** ([`error`]) - fatal and recoverable failures of the layer
//! - **Handles** ([`handle`]) - the per-file descriptor and its stable id
//! - **Registry** ([`registry`]) - the handle table and every per-handle operation
//! - **Sessions** ([`session`]) - typed item transfers bound to one selected handle
//! - **Positions** ([`position`]) - byte offsets for restart bookkeeping
//! - **Backups** ([`backup`]) - rename-before-overwrite for canonical outputs
//!
//! ## Locking
//!
//! The handle table sits behind one lock that is only held while looking up,
//! inserting or removing entries. Each handle carries its own lock, taken for
//! the length of one item transfer, so different files are served in parallel.

pub mod backup;
pub mod config;
pub mod error;
pub mod handle;
pub mod position;
pub mod registry;
pub mod session;
