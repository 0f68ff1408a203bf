//! Command implementations

pub mod lookup;
pub mod serve;
pub mod validate;

pub use lookup::run_lookup;
pub use serve::run_serve;
pub use validate::{run_cleanup, run_validate};
