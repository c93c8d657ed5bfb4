pub mod entity;
pub mod question;

pub use entity::Entity;
pub use question::{Category, Difficulty, Provenance, Question};
