mod lodging;

pub use lodging::*;
