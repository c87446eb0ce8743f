//! Storage layer
//!
//! Uses SQLite (embedded, no external dependencies). Two flat tables; the
//! posts table references users only logically, not via a foreign key.

pub mod db;

pub use db::Database;
