pub mod config;
pub mod family;
pub mod feature;
pub mod mode;
pub mod store;

pub use config::*;
pub use family::*;
pub use feature::*;
pub use mode::*;
pub use store::*;
