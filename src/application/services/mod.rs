//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, InputSource)
//! but are themselves concrete structs, not traits.

mod evaluation;
mod session;

pub use evaluation::{Comparison, DirectionReport, EvaluationService};
pub use session::Session;
