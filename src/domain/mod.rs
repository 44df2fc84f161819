pub mod agent;
pub mod slot;

pub use agent::*;
pub use slot::*;
