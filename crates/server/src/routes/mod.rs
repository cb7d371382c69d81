mod analyses;
mod health;
pub mod sse;

pub use analyses::*;
pub use health::*;
