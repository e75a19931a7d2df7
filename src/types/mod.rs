pub mod quote;
pub mod source;
