pub mod date;
pub mod text;

pub use date::*;
pub use text::*;
