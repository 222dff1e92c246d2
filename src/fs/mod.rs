//! Filesystem utilities for depot.
//!
//! Task records must never be observed half-written, so every record write
//! goes through [`atomic::atomic_write`].

pub mod atomic;

pub use atomic::atomic_write_file;
