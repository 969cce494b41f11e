//! Wayfare Upload Storage
//!
//! Storage backends for admin-uploaded media (package and vehicle
//! images, policy PDFs). The local backend writes files under a public
//! uploads directory that the server exposes at `/uploads`.

pub mod backend;
pub mod error;
pub mod local;

pub use backend::{StorageBackend, StoredFile, sanitize_file_name};
pub use error::StorageError;
pub use local::LocalStorage;
