pub mod appointment;
pub mod page;
pub mod payment;
pub mod registry;
