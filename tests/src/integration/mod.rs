pub mod contracts;
pub mod flows;
pub mod worker;
