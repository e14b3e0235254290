pub mod feed;
pub mod filter;
pub mod index;
pub mod loader;
pub mod model;
pub mod share;
pub mod snapshot;
pub mod towns;

pub use snapshot::Catalog;
