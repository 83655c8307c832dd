pub mod map;
pub mod survey;
pub mod validate;
