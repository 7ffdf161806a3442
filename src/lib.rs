//! Song Catalog - an HTTP catalog of songs with lyrics
//!
//! This library provides the core of the Song Catalog server: the song model,
//! couplet pagination, storage and metadata provider traits with their
//! production backends, and the HTTP handlers.

pub mod lyrics;
pub mod metadata;
pub mod server;
pub mod song;
pub mod storage;
