pub mod aggregate;
pub mod config;
pub mod db;
pub mod diagnostics;
pub mod error;
pub mod library;
pub mod models;
pub mod normalize;
pub mod overlay;
pub mod query;
pub mod search;
pub mod seed;
pub mod source;

pub use config::LibraryConfig;
pub use db::{open_media_store, MediaStoreDb};
pub use error::{CoreError, ErrorKind};
pub use library::{MediaLibrary, Snapshot};
pub use search::SearchSupervisor;
pub use source::{MediaSource, MemorySource, SqliteMediaSource};
