// HTTP routes
pub mod categories;
pub mod health;
pub mod request;

pub use categories::*;
pub use health::*;
pub use request::*;
