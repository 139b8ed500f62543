// src/handlers/payments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::payment::{Payment, PaymentMethod},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPaymentPayload {
    pub method: PaymentMethod,

    /// Obrigatório para CARD (1 a 6); ausente ou 1 para CASH/PIX.
    #[validate(range(min = 1, max = 6, message = "O número de parcelas deve estar entre 1 e 6."))]
    #[schema(example = 3)]
    pub installments: Option<i32>,
}

// POST /api/appointments/{id}/payments
#[utoipa::path(
    post,
    path = "/api/appointments/{id}/payments",
    tag = "Payments",
    request_body = RegisterPaymentPayload,
    responses(
        (status = 201, description = "Pagamento aprovado registrado; agendamento concluído", body = Payment),
        (status = 404, description = "Agendamento não encontrado"),
        (status = 409, description = "Agendamento fora de WAITING_PAYMENT ou já pago")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do agendamento")
    )
)]
pub async fn register_payment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RegisterPaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let payment = app_state
        .payment_service
        .register_payment(&app_state.db_pool, id, payload.method, payload.installments)
        .await?;

    Ok((StatusCode::CREATED, Json(payment)))
}
