//! # simio
//!
//! Structured-record file I/O for long-running simulations: typed scalars,
//! vectors and strings go to plain text, host-native binary, or a portable
//! XDR-style encoding through one item-transfer API, with handle tracking,
//! backups on overwrite and byte-offset bookkeeping for checkpoint restarts.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** Stateless value types, the file-type table and
//!   the three primitive codecs.
//!
//! - **[`engine`]: The Stateful Layer.** The handle registry, per-handle
//!   sessions that carry their codec, position tracking and backups.
//!
//! - **[`workflows`]: The Public API.** Higher-level procedures built on the
//!   engine, such as copying an item stream between encodings.
//!
//! ```no_run
//! use simio::engine::registry::FileRegistry;
//!
//! # fn main() -> Result<(), simio::engine::error::FioError> {
//! let registry = FileRegistry::default();
//! let id = registry.open("traj.trr", "w")?;
//! let fio = registry.select(id)?;
//! fio.write_int(42, "natoms")?;
//! fio.write_string("hello world", "title")?;
//! registry.close(id)?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod engine;
pub mod workflows;
