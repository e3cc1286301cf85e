pub mod collate;
pub mod engine;
pub mod matcher;
pub mod params;
pub mod server;
pub mod spec;

pub use engine::*;
pub use matcher::*;
pub use params::*;
pub use server::*;
pub use spec::*;
