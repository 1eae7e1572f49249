pub mod loaders;
pub mod types;


pub use loaders::*;
pub use types::*;
