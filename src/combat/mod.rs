pub mod constants;
pub mod resolver;
pub mod weapons;
