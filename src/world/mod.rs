pub mod objects;
pub mod zone;
