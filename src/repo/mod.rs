pub mod storage;
pub mod task;

pub use storage::*;
pub use task::*;
