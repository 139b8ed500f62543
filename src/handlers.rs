pub mod appointments;
pub mod payments;
pub mod registry;
