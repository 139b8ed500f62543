// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Appointments ---
        handlers::appointments::create_appointment,
        handlers::appointments::add_items,
        handlers::appointments::apply_action,
        handlers::appointments::find_by_id,
        handlers::appointments::list_future,
        handlers::appointments::list_history,

        // --- Payments ---
        handlers::payments::register_payment,

        // --- Registry ---
        handlers::registry::create_owner,
        handlers::registry::get_owner,
        handlers::registry::list_owners,
        handlers::registry::apply_owner_action,
        handlers::registry::create_pet,
        handlers::registry::get_pet,
        handlers::registry::list_pets,
        handlers::registry::create_catalog_entry,
        handlers::registry::get_catalog_entry,
        handlers::registry::list_catalog,
        handlers::registry::apply_catalog_action,
    ),
    components(schemas(
        models::appointment::Appointment,
        models::appointment::AppointmentItem,
        models::appointment::AppointmentItemDetail,
        models::appointment::AppointmentDetail,
        models::appointment::AppointmentStatus,
        models::appointment::AppointmentAction,
        models::payment::Payment,
        models::payment::PaymentMethod,
        models::payment::PaymentStatus,
        models::registry::Owner,
        models::registry::Pet,
        models::registry::CatalogEntry,
        models::registry::Status,
        models::registry::PetSize,
        models::registry::StatusAction,
    )),
    tags(
        (name = "Appointments", description = "Ciclo de vida de agendamentos"),
        (name = "Payments", description = "Registro de pagamentos"),
        (name = "Registry", description = "Cadastros de donos, pets e catálogo")
    )
)]
pub struct ApiDoc;
