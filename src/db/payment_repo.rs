// src/db/payment_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::payment::{Payment, PaymentMethod, PaymentStatus},
};

#[derive(Clone)]
pub struct PaymentRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        appointment_id: Uuid,
        method: PaymentMethod,
        status: PaymentStatus,
        installments: i32,
        final_amount: Decimal,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (appointment_id, method, status, installments, final_amount)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(appointment_id)
        .bind(method)
        .bind(status)
        .bind(installments)
        .bind(final_amount)
        .fetch_one(executor)
        .await?;

        Ok(payment)
    }

    /// "Este agendamento já tem pagamento aprovado?"
    pub async fn exists_approved_for_appointment<'e, E>(
        &self,
        executor: E,
        appointment_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM payments
                WHERE appointment_id = $1 AND status = 'APPROVED'
            )
            "#,
        )
        .bind(appointment_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }
}
