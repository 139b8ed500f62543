// src/db/appointment_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::appointment::{Appointment, AppointmentItem, AppointmentItemDetail, AppointmentStatus},
};

#[derive(Clone)]
pub struct AppointmentRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  AGENDAMENTOS
    // =========================================================================

    pub async fn create<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        pet_id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (owner_id, pet_id, scheduled_at)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(pet_id)
        .bind(scheduled_at)
        .fetch_one(executor)
        .await?;

        Ok(appointment)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointment =
            sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(appointment)
    }

    /// Aquisição exclusiva por agendamento: `FOR UPDATE` bloqueia a linha até
    /// o commit/rollback da transação corrente. Toda mutação de um
    /// agendamento existente passa por aqui antes de ler o agregado.
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointment =
            sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(appointment)
    }

    /// Persiste o resultado das transições do agregado (status, total,
    /// closed_at). Nenhum outro caminho escreve nesses campos.
    pub async fn save<'e, E>(
        &self,
        executor: E,
        appointment: &Appointment,
    ) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let saved = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET status = $1, total_gross = $2, closed_at = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(appointment.status)
        .bind(appointment.total_gross)
        .bind(appointment.closed_at)
        .bind(appointment.id)
        .fetch_one(executor)
        .await?;

        Ok(saved)
    }

    /// "O pet X já tem agendamento aberto neste horário?"
    pub async fn exists_for_pet_at<'e, E>(
        &self,
        executor: E,
        pet_id: Uuid,
        scheduled_at: DateTime<Utc>,
        statuses: &[AppointmentStatus],
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM appointments
                WHERE pet_id = $1 AND scheduled_at = $2 AND status = ANY($3)
            )
            "#,
        )
        .bind(pet_id)
        .bind(scheduled_at)
        .bind(statuses)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// "O dono X tem algum agendamento aberto?" Consumido pela guarda de
    /// desativação de dono.
    pub async fn exists_open_for_owner<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        statuses: &[AppointmentStatus],
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM appointments
                WHERE owner_id = $1 AND status = ANY($2)
            )
            "#,
        )
        .bind(owner_id)
        .bind(statuses)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    pub async fn list_future<'e, E>(
        &self,
        executor: E,
        now: DateTime<Utc>,
        statuses: &[AppointmentStatus],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE scheduled_at > $1 AND status = ANY($2)
            ORDER BY scheduled_at ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(now)
        .bind(statuses)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;

        Ok(appointments)
    }

    pub async fn count_future<'e, E>(
        &self,
        executor: E,
        now: DateTime<Utc>,
        statuses: &[AppointmentStatus],
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM appointments WHERE scheduled_at > $1 AND status = ANY($2)",
        )
        .bind(now)
        .bind(statuses)
        .fetch_one(executor)
        .await?;

        Ok(total)
    }

    pub async fn list_history<'e, E>(
        &self,
        executor: E,
        now: DateTime<Utc>,
        statuses: &[AppointmentStatus],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE scheduled_at < $1 AND status = ANY($2)
            ORDER BY scheduled_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(now)
        .bind(statuses)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;

        Ok(appointments)
    }

    pub async fn count_history<'e, E>(
        &self,
        executor: E,
        now: DateTime<Utc>,
        statuses: &[AppointmentStatus],
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM appointments WHERE scheduled_at < $1 AND status = ANY($2)",
        )
        .bind(now)
        .bind(statuses)
        .fetch_one(executor)
        .await?;

        Ok(total)
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    /// Itens são imutáveis: só existe INSERT, nunca UPDATE. Correções entram
    /// como novos itens.
    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        appointment_id: Uuid,
        catalog_id: Uuid,
        quantity: i32,
        unit_price_applied: Decimal,
        subtotal: Decimal,
    ) -> Result<AppointmentItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, AppointmentItem>(
            r#"
            INSERT INTO appointment_items (
                appointment_id, catalog_id, quantity, unit_price_applied, subtotal
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(appointment_id)
        .bind(catalog_id)
        .bind(quantity)
        .bind(unit_price_applied)
        .bind(subtotal)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        appointment_id: Uuid,
    ) -> Result<Vec<AppointmentItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, AppointmentItem>(
            "SELECT * FROM appointment_items WHERE appointment_id = $1 ORDER BY created_at ASC",
        )
        .bind(appointment_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    /// Itens com nome do serviço, para montar o snapshot da API.
    pub async fn list_item_details<'e, E>(
        &self,
        executor: E,
        appointment_id: Uuid,
    ) -> Result<Vec<AppointmentItemDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, AppointmentItemDetail>(
            r#"
            SELECT
                i.id, i.catalog_id, c.name AS catalog_name,
                i.quantity, i.unit_price_applied, i.subtotal
            FROM appointment_items i
            JOIN catalog c ON c.id = i.catalog_id
            WHERE i.appointment_id = $1
            ORDER BY i.created_at ASC
            "#,
        )
        .bind(appointment_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    /// Busca em lote para as listagens paginadas.
    pub async fn list_item_details_for<'e, E>(
        &self,
        executor: E,
        appointment_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, AppointmentItemDetail)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ItemDetailRow>(
            r#"
            SELECT
                i.appointment_id,
                i.id, i.catalog_id, c.name AS catalog_name,
                i.quantity, i.unit_price_applied, i.subtotal
            FROM appointment_items i
            JOIN catalog c ON c.id = i.catalog_id
            WHERE i.appointment_id = ANY($1)
            ORDER BY i.created_at ASC
            "#,
        )
        .bind(appointment_ids)
        .fetch_all(executor)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                (
                    r.appointment_id,
                    AppointmentItemDetail {
                        id: r.id,
                        catalog_id: r.catalog_id,
                        catalog_name: r.catalog_name,
                        quantity: r.quantity,
                        unit_price_applied: r.unit_price_applied,
                        subtotal: r.subtotal,
                    },
                )
            })
            .collect())
    }
}

#[derive(sqlx::FromRow)]
struct ItemDetailRow {
    appointment_id: Uuid,
    id: Uuid,
    catalog_id: Uuid,
    catalog_name: String,
    quantity: i32,
    unit_price_applied: Decimal,
    subtotal: Decimal,
}
