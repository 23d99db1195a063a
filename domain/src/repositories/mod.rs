mod catalog;
mod lodging;
mod place;

pub use catalog::*;
pub use lodging::*;
pub use place::*;
