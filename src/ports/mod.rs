//! Port traits at the boundary between domain logic and adapters.

pub mod config_port;
pub mod fact_port;
