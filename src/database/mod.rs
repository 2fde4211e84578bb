/*!
 * Database module for persistent storage.
 *
 * This module provides SQLite-based persistence for:
 * - Uploaded subtitle files and their extracted vocabulary
 * - The dictionary cache shared across files and runs
 * - Quiz attempts and per-word review counters
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::DatabaseConnection;
pub use repository::Repository;
