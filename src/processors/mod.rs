mod backup;
pub mod fingerprint;
mod log;
mod rename;
mod rewrite;
mod scan;

pub use backup::*;
pub use log::*;
pub use rename::*;
pub use rewrite::*;
pub use scan::*;
