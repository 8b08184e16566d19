//! Database models and queries

pub mod composers;
pub mod compositions;
pub mod init;
pub mod models;

pub use init::*;
pub use models::*;
