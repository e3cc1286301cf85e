pub mod time;
pub mod video;

pub use time::*;
pub use video::*;
