pub mod health;
pub mod import;
pub mod orders;
pub mod session;

pub use health::*;
pub use import::*;
pub use orders::*;
pub use session::*;
