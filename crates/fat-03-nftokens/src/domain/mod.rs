pub mod errors;
pub mod map;
pub mod tokens;
