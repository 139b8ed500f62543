pub mod appointment_service;
pub use appointment_service::AppointmentService;
pub mod payment_service;
pub use payment_service::PaymentService;
pub mod registry_service;
pub use registry_service::RegistryService;
