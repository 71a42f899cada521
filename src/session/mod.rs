pub mod bootstrap;
pub mod catalog;
pub mod manager;
pub mod types;


pub use bootstrap::*;
pub use catalog::*;
pub use manager::*;
pub use types::*;
