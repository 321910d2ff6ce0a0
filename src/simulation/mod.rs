pub mod behavior;
pub mod crime;
pub mod needs;
pub mod perception;
pub mod tick;
