//! File Storage
//!
//! Upload, download and removal of files in an S3-compatible bucket
//! (MinIO in development). Without an `S3_URL` the files live in memory
//! for the lifetime of the process.
//!
//! - **`storage`** - `FileStore`, a bucket behind `object_store`
//! - **`handlers`** - `/minio/**` HTTP handlers

/// Object store access
pub mod storage;

/// HTTP handlers
pub mod handlers;

pub use storage::{FileStore, UploadResponse};
