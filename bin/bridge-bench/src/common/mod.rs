mod args;
pub use args::*;

mod error;
pub use error::*;

mod hex;
pub use hex::*;

mod logging;
pub use logging::*;
