mod error;
mod loader;
mod schema;

pub use error::*;
pub use loader::*;
pub use schema::*;
