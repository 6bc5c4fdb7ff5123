mod pool;

pub use pool::{create_pool, unique_violation};
