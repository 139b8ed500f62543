// src/models/registry.rs
//
// Cadastros consumidos pelo núcleo de agendamento: donos, pets e catálogo de
// serviços. O núcleo só lê os campos de que precisa (status, porte, preço).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "entity_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "pet_size", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PetSize {
    Small,
    Medium,
    Large,
}

/// Ação de ativação/desativação aplicável a donos e itens de catálogo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusAction {
    Activate,
    Deactivate,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: Uuid,
    #[schema(example = "Maria Silva")]
    pub name: String,
    #[schema(example = "+55 11 91234-5678")]
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[schema(example = "Rex")]
    pub name: String,
    pub size: PetSize,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: Uuid,
    #[schema(example = "Banho e tosa")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 60)]
    pub duration_minutes: i32,
    #[schema(example = "40.00")]
    pub price_small: Decimal,
    #[schema(example = "55.00")]
    pub price_medium: Decimal,
    #[schema(example = "70.00")]
    pub price_large: Decimal,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

impl CatalogEntry {
    /// Exatamente uma coluna de preço por porte.
    pub fn price_for_size(&self, size: PetSize) -> Decimal {
        match size {
            PetSize::Small => self.price_small,
            PetSize::Medium => self.price_medium,
            PetSize::Large => self.price_large,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn price_for_size_selects_single_column() {
        let entry = CatalogEntry {
            id: Uuid::new_v4(),
            name: "Banho".into(),
            description: None,
            duration_minutes: 45,
            price_small: dec!(40.00),
            price_medium: dec!(55.00),
            price_large: dec!(70.00),
            status: Status::Active,
            created_at: Utc::now(),
        };

        assert_eq!(entry.price_for_size(PetSize::Small), dec!(40.00));
        assert_eq!(entry.price_for_size(PetSize::Medium), dec!(55.00));
        assert_eq!(entry.price_for_size(PetSize::Large), dec!(70.00));
    }
}
