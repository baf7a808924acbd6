pub mod call;
pub mod context;
pub mod errors;
pub mod scope;
pub mod value;
