mod cmd;
pub use cmd::*;

mod plan;
pub use plan::*;
