//! Database models, schema and the song store

pub mod init;
pub mod migrations;
pub mod models;
pub mod songs;

pub use init::*;
pub use migrations::*;
pub use models::*;
pub use songs::{SongStore, SqliteSongStore};
