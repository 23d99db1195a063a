pub mod serde;
pub mod text;
