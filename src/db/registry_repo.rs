// src/db/registry_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::registry::{CatalogEntry, Owner, Pet, PetSize, Status},
};

#[derive(Clone)]
pub struct RegistryRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl RegistryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  DONOS
    // =========================================================================

    pub async fn create_owner<'e, E>(
        &self,
        executor: E,
        name: &str,
        phone: &str,
        email: Option<&str>,
        address: Option<&str>,
    ) -> Result<Owner, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let owner = sqlx::query_as::<_, Owner>(
            r#"
            INSERT INTO owners (name, phone, email, address)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(phone)
        .bind(email)
        .bind(address)
        .fetch_one(executor)
        .await?;

        Ok(owner)
    }

    pub async fn find_owner<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Owner>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let owner = sqlx::query_as::<_, Owner>("SELECT * FROM owners WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(owner)
    }

    pub async fn list_owners<'e, E>(
        &self,
        executor: E,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Owner>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let owners = sqlx::query_as::<_, Owner>(
            "SELECT * FROM owners ORDER BY name ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;

        Ok(owners)
    }

    pub async fn count_owners<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM owners")
            .fetch_one(executor)
            .await?;

        Ok(total)
    }

    pub async fn update_owner_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: Status,
    ) -> Result<Owner, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let owner =
            sqlx::query_as::<_, Owner>("UPDATE owners SET status = $1 WHERE id = $2 RETURNING *")
                .bind(status)
                .bind(id)
                .fetch_one(executor)
                .await?;

        Ok(owner)
    }

    // =========================================================================
    //  PETS
    // =========================================================================

    pub async fn create_pet<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        name: &str,
        size: PetSize,
        notes: Option<&str>,
    ) -> Result<Pet, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pet = sqlx::query_as::<_, Pet>(
            r#"
            INSERT INTO pets (owner_id, name, size, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(size)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(pet)
    }

    pub async fn find_pet<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Pet>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pet = sqlx::query_as::<_, Pet>("SELECT * FROM pets WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(pet)
    }

    /// Filtro opcional por dono: `$1` nulo lista todos os pets.
    pub async fn list_pets<'e, E>(
        &self,
        executor: E,
        owner_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Pet>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pets = sqlx::query_as::<_, Pet>(
            r#"
            SELECT * FROM pets
            WHERE ($1::uuid IS NULL OR owner_id = $1)
            ORDER BY name ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;

        Ok(pets)
    }

    pub async fn count_pets<'e, E>(
        &self,
        executor: E,
        owner_id: Option<Uuid>,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM pets WHERE ($1::uuid IS NULL OR owner_id = $1)",
        )
        .bind(owner_id)
        .fetch_one(executor)
        .await?;

        Ok(total)
    }

    // =========================================================================
    //  CATÁLOGO
    // =========================================================================

    pub async fn create_catalog_entry<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        duration_minutes: i32,
        price_small: Decimal,
        price_medium: Decimal,
        price_large: Decimal,
    ) -> Result<CatalogEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, CatalogEntry>(
            r#"
            INSERT INTO catalog (
                name, description, duration_minutes, price_small, price_medium, price_large
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(duration_minutes)
        .bind(price_small)
        .bind(price_medium)
        .bind(price_large)
        .fetch_one(executor)
        .await?;

        Ok(entry)
    }

    pub async fn find_catalog_entry<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<CatalogEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, CatalogEntry>("SELECT * FROM catalog WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(entry)
    }

    pub async fn update_catalog_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: Status,
    ) -> Result<CatalogEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, CatalogEntry>(
            "UPDATE catalog SET status = $1 WHERE id = $2 RETURNING *",
        )
        .bind(status)
        .bind(id)
        .fetch_one(executor)
        .await?;

        Ok(entry)
    }

    pub async fn list_catalog<'e, E>(
        &self,
        executor: E,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CatalogEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, CatalogEntry>(
            "SELECT * FROM catalog ORDER BY name ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;

        Ok(entries)
    }

    pub async fn count_catalog<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM catalog")
            .fetch_one(executor)
            .await?;

        Ok(total)
    }
}
