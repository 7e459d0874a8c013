//! Per-team status at an event and its rendered sentence.

mod compose;
pub mod narrative;

pub use compose::generate_status;
pub use narrative::describe;
