pub mod engine;
pub mod session;

pub use engine::{select, SelectionParams};
pub use session::{load_session, save_session, SelectionSession};
