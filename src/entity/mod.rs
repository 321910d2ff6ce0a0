pub mod character;
pub mod intent;
pub mod job;
pub mod memory;
