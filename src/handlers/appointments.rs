// src/handlers/appointments.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::appointment::{AppointmentAction, AppointmentDetail, AppointmentStatus},
    models::page::Page,
};

// Serialize é exigido pela validação aninhada (`nested`) dos payloads que
// carregam a lista de itens.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentItemPayload {
    pub catalog_id: Uuid,

    #[validate(range(min = 1, message = "A quantidade deve ser no mínimo 1."))]
    #[schema(example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentPayload {
    pub owner_id: Uuid,

    pub pet_id: Uuid,

    #[schema(example = "2026-09-15T14:00:00Z")]
    pub scheduled_at: DateTime<Utc>,

    #[validate(length(min = 1, message = "Pelo menos um item deve ser informado."), nested)]
    pub items: Vec<AppointmentItemPayload>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddItemsPayload {
    #[validate(length(min = 1, message = "Pelo menos um item deve ser informado."), nested)]
    pub items: Vec<AppointmentItemPayload>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentActionPayload {
    pub action: AppointmentAction,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Filtro de status (opcional).
    pub status: Option<AppointmentStatus>,
    /// Página (base 0).
    pub page: Option<i64>,
    /// Tamanho da página.
    pub size: Option<i64>,
}

// POST /api/appointments
#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Appointments",
    request_body = CreateAppointmentPayload,
    responses(
        (status = 201, description = "Agendamento criado com seus itens", body = AppointmentDetail),
        (status = 404, description = "Dono, pet ou item de catálogo não encontrado"),
        (status = 409, description = "Regra de negócio violada (dono inativo, conflito de horário...)")
    )
)]
pub async fn create_appointment(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateAppointmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let detail = app_state
        .appointment_service
        .create_appointment(
            &app_state.db_pool,
            payload.owner_id,
            payload.pet_id,
            payload.scheduled_at,
            &payload.items,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// POST /api/appointments/{id}/items
#[utoipa::path(
    post,
    path = "/api/appointments/{id}/items",
    tag = "Appointments",
    request_body = AddItemsPayload,
    responses(
        (status = 200, description = "Itens adicionados; total recalculado sobre o conjunto completo", body = AppointmentDetail),
        (status = 404, description = "Agendamento ou item de catálogo não encontrado"),
        (status = 409, description = "Agendamento travado, cancelado ou dono inativo")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do agendamento")
    )
)]
pub async fn add_items(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddItemsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let detail = app_state
        .appointment_service
        .add_items(&app_state.db_pool, id, &payload.items)
        .await?;

    Ok(Json(detail))
}

// POST /api/appointments/{id}/actions
#[utoipa::path(
    post,
    path = "/api/appointments/{id}/actions",
    tag = "Appointments",
    request_body = AppointmentActionPayload,
    responses(
        (status = 200, description = "Transição aplicada", body = AppointmentDetail),
        (status = 404, description = "Agendamento não encontrado"),
        (status = 409, description = "Transição inválida para o estado atual")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do agendamento")
    )
)]
pub async fn apply_action(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AppointmentActionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .appointment_service
        .apply_action(&app_state.db_pool, id, payload.action)
        .await?;

    Ok(Json(detail))
}

// GET /api/appointments/{id}
#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    responses(
        (status = 200, description = "Snapshot do agendamento com itens", body = AppointmentDetail),
        (status = 404, description = "Agendamento não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do agendamento")
    )
)]
pub async fn find_by_id(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .appointment_service
        .find_by_id(&app_state.db_pool, id)
        .await?;

    Ok(Json(detail))
}

// GET /api/appointments/future
#[utoipa::path(
    get,
    path = "/api/appointments/future",
    tag = "Appointments",
    responses(
        (status = 200, description = "Agendamentos futuros em status aberto", body = Page<AppointmentDetail>),
        (status = 400, description = "Filtro de status inválido para a visão de futuros")
    ),
    params(ListParams)
)]
pub async fn list_future(
    State(app_state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state
        .appointment_service
        .list_future(
            &app_state.db_pool,
            params.status,
            params.page.unwrap_or(0),
            params.size.unwrap_or(20),
        )
        .await?;

    Ok(Json(page))
}

// GET /api/appointments/history
#[utoipa::path(
    get,
    path = "/api/appointments/history",
    tag = "Appointments",
    responses(
        (status = 200, description = "Histórico de agendamentos", body = Page<AppointmentDetail>)
    ),
    params(ListParams)
)]
pub async fn list_history(
    State(app_state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state
        .appointment_service
        .list_history(
            &app_state.db_pool,
            params.status,
            params.page.unwrap_or(0),
            params.size.unwrap_or(20),
        )
        .await?;

    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32) -> AppointmentItemPayload {
        AppointmentItemPayload {
            catalog_id: Uuid::new_v4(),
            quantity,
        }
    }

    #[test]
    fn payload_without_items_fails_validation() {
        let payload = AddItemsPayload { items: vec![] };
        assert!(payload.validate().is_err());

        let payload = AddItemsPayload { items: vec![item(1)] };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn nested_item_validation_rejects_zero_quantity() {
        let payload = AddItemsPayload {
            items: vec![item(1), item(0)],
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn create_payload_validates_nested_items() {
        let payload = CreateAppointmentPayload {
            owner_id: Uuid::new_v4(),
            pet_id: Uuid::new_v4(),
            scheduled_at: Utc::now(),
            items: vec![],
        };
        assert!(payload.validate().is_err());
    }
}
