pub mod audiobook_repository;

pub use audiobook_repository::{AudiobookRepository, PgAudiobookRepository};
