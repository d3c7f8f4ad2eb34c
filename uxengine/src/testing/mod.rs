mod context;
pub use context::*;

mod mocks;
pub use mocks::*;
