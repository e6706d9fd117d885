pub mod language;
pub mod media;
pub mod models;
pub mod title;
