pub mod models;
pub mod repository;

pub use models::InteractionRecord;
pub use repository::InteractionRepository;
