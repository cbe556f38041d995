//! PostgreSQL adapter for the Reelbox `VideoRepository` port

mod repository;
mod row;

pub use repository::PgVideoRepository;
