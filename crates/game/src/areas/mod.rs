//! Concrete liminal areas.

pub mod motel;
pub mod pool;

pub use motel::MotelCorridor;
pub use pool::DrainedPool;
