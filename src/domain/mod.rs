//! Cart domain model: lines, money, derived snapshots and the ports the engine talks to.

pub mod cart;
pub mod identity;
pub mod line;
pub mod money;
pub mod ports;
pub mod snapshot;
pub mod summary;
