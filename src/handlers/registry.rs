// src/handlers/registry.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::page::Page,
    models::registry::{CatalogEntry, Owner, Pet, PetSize, StatusAction},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Página (base 0).
    pub page: Option<i64>,
    /// Tamanho da página.
    pub size: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PetListParams {
    /// Filtro opcional por dono.
    pub owner_id: Option<Uuid>,
    /// Página (base 0).
    pub page: Option<i64>,
    /// Tamanho da página.
    pub size: Option<i64>,
}

// =============================================================================
//  DONOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOwnerPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Maria Silva")]
    pub name: String,

    #[validate(length(min = 8, message = "O telefone deve ter pelo menos 8 dígitos."))]
    #[schema(example = "+55 11 91234-5678")]
    pub phone: String,

    #[validate(email(message = "E-mail inválido."))]
    pub email: Option<String>,

    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusActionPayload {
    pub action: StatusAction,
}

// POST /api/owners
#[utoipa::path(
    post,
    path = "/api/owners",
    tag = "Registry",
    request_body = CreateOwnerPayload,
    responses(
        (status = 201, description = "Dono cadastrado", body = Owner)
    )
)]
pub async fn create_owner(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateOwnerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let owner = app_state
        .registry_service
        .create_owner(
            &app_state.db_pool,
            &payload.name,
            &payload.phone,
            payload.email.as_deref(),
            payload.address.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(owner)))
}

// GET /api/owners/{id}
#[utoipa::path(
    get,
    path = "/api/owners/{id}",
    tag = "Registry",
    responses(
        (status = 200, description = "Dono", body = Owner),
        (status = 404, description = "Dono não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do dono"))
)]
pub async fn get_owner(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let owner = app_state
        .registry_service
        .get_owner(&app_state.db_pool, id)
        .await?;

    Ok(Json(owner))
}

// GET /api/owners
#[utoipa::path(
    get,
    path = "/api/owners",
    tag = "Registry",
    responses(
        (status = 200, description = "Donos cadastrados, ordenados por nome", body = Page<Owner>)
    ),
    params(PageParams)
)]
pub async fn list_owners(
    State(app_state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state
        .registry_service
        .list_owners(
            &app_state.db_pool,
            params.page.unwrap_or(0),
            params.size.unwrap_or(20),
        )
        .await?;

    Ok(Json(page))
}

// POST /api/owners/{id}/actions
#[utoipa::path(
    post,
    path = "/api/owners/{id}/actions",
    tag = "Registry",
    request_body = StatusActionPayload,
    responses(
        (status = 200, description = "Status do dono atualizado", body = Owner),
        (status = 409, description = "Dono com agendamentos abertos não pode ser desativado")
    ),
    params(("id" = Uuid, Path, description = "ID do dono"))
)]
pub async fn apply_owner_action(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusActionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let owner = app_state
        .registry_service
        .apply_owner_action(&app_state.db_pool, id, payload.action)
        .await?;

    Ok(Json(owner))
}

// =============================================================================
//  PETS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePetPayload {
    pub owner_id: Uuid,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Rex")]
    pub name: String,

    /// Porte do pet; imutável após o cadastro (determina o preço aplicado).
    pub size: PetSize,

    pub notes: Option<String>,
}

// POST /api/pets
#[utoipa::path(
    post,
    path = "/api/pets",
    tag = "Registry",
    request_body = CreatePetPayload,
    responses(
        (status = 201, description = "Pet cadastrado", body = Pet),
        (status = 404, description = "Dono não encontrado")
    )
)]
pub async fn create_pet(
    State(app_state): State<AppState>,
    Json(payload): Json<CreatePetPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let pet = app_state
        .registry_service
        .create_pet(
            &app_state.db_pool,
            payload.owner_id,
            &payload.name,
            payload.size,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(pet)))
}

// GET /api/pets/{id}
#[utoipa::path(
    get,
    path = "/api/pets/{id}",
    tag = "Registry",
    responses(
        (status = 200, description = "Pet", body = Pet),
        (status = 404, description = "Pet não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do pet"))
)]
pub async fn get_pet(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pet = app_state
        .registry_service
        .get_pet(&app_state.db_pool, id)
        .await?;

    Ok(Json(pet))
}

// GET /api/pets
#[utoipa::path(
    get,
    path = "/api/pets",
    tag = "Registry",
    responses(
        (status = 200, description = "Pets cadastrados, com filtro opcional por dono", body = Page<Pet>)
    ),
    params(PetListParams)
)]
pub async fn list_pets(
    State(app_state): State<AppState>,
    Query(params): Query<PetListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state
        .registry_service
        .list_pets(
            &app_state.db_pool,
            params.owner_id,
            params.page.unwrap_or(0),
            params.size.unwrap_or(20),
        )
        .await?;

    Ok(Json(page))
}

// =============================================================================
//  CATÁLOGO
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatalogEntryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Banho e tosa")]
    pub name: String,

    pub description: Option<String>,

    #[validate(range(min = 1, message = "A duração deve ser de pelo menos 1 minuto."))]
    #[schema(example = 60)]
    pub duration_minutes: i32,

    #[schema(example = "40.00")]
    pub price_small: Decimal,

    #[schema(example = "55.00")]
    pub price_medium: Decimal,

    #[schema(example = "70.00")]
    pub price_large: Decimal,
}

// POST /api/catalog
#[utoipa::path(
    post,
    path = "/api/catalog",
    tag = "Registry",
    request_body = CreateCatalogEntryPayload,
    responses(
        (status = 201, description = "Serviço cadastrado no catálogo", body = CatalogEntry),
        (status = 400, description = "Preço ou duração inválidos")
    )
)]
pub async fn create_catalog_entry(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCatalogEntryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entry = app_state
        .registry_service
        .create_catalog_entry(
            &app_state.db_pool,
            &payload.name,
            payload.description.as_deref(),
            payload.duration_minutes,
            payload.price_small,
            payload.price_medium,
            payload.price_large,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

// GET /api/catalog/{id}
#[utoipa::path(
    get,
    path = "/api/catalog/{id}",
    tag = "Registry",
    responses(
        (status = 200, description = "Serviço do catálogo", body = CatalogEntry),
        (status = 404, description = "Item de catálogo não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do serviço"))
)]
pub async fn get_catalog_entry(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let entry = app_state
        .registry_service
        .get_catalog_entry(&app_state.db_pool, id)
        .await?;

    Ok(Json(entry))
}

// GET /api/catalog
#[utoipa::path(
    get,
    path = "/api/catalog",
    tag = "Registry",
    responses(
        (status = 200, description = "Serviços do catálogo, ordenados por nome", body = Page<CatalogEntry>)
    ),
    params(PageParams)
)]
pub async fn list_catalog(
    State(app_state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state
        .registry_service
        .list_catalog(
            &app_state.db_pool,
            params.page.unwrap_or(0),
            params.size.unwrap_or(20),
        )
        .await?;

    Ok(Json(page))
}

// POST /api/catalog/{id}/actions
#[utoipa::path(
    post,
    path = "/api/catalog/{id}/actions",
    tag = "Registry",
    request_body = StatusActionPayload,
    responses(
        (status = 200, description = "Status do serviço atualizado", body = CatalogEntry),
        (status = 404, description = "Item de catálogo não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do serviço"))
)]
pub async fn apply_catalog_action(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusActionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let entry = app_state
        .registry_service
        .apply_catalog_action(&app_state.db_pool, id, payload.action)
        .await?;

    Ok(Json(entry))
}
