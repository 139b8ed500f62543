pub mod appointment_repo;
pub use appointment_repo::AppointmentRepository;
pub mod payment_repo;
pub use payment_repo::PaymentRepository;
pub mod registry_repo;
pub use registry_repo::RegistryRepository;
