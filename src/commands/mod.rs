pub mod config;
pub mod resolve;
pub mod status;

pub use config::*;
pub use resolve::*;
pub use status::*;
