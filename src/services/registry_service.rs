// src/services/registry_service.rs
//
// Cadastros (donos, pets, catálogo). CRUD simples, com exceção da guarda de
// desativação de dono, que consome o predicado de "agendamento aberto" do
// núcleo.

use rust_decimal::Decimal;
use sqlx::{Acquire, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AppointmentRepository, RegistryRepository},
    models::{
        appointment::AppointmentStatus,
        page::Page,
        registry::{CatalogEntry, Owner, Pet, PetSize, Status, StatusAction},
    },
    services::appointment_service::sanitize_page,
};

#[derive(Clone)]
pub struct RegistryService {
    registry_repo: RegistryRepository,
    appointment_repo: AppointmentRepository,
}

impl RegistryService {
    pub fn new(registry_repo: RegistryRepository, appointment_repo: AppointmentRepository) -> Self {
        Self {
            registry_repo,
            appointment_repo,
        }
    }

    // --- DONOS ---

    pub async fn create_owner<'e, A>(
        &self,
        conn: A,
        name: &str,
        phone: &str,
        email: Option<&str>,
        address: Option<&str>,
    ) -> Result<Owner, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;
        let owner = self
            .registry_repo
            .create_owner(&mut *conn, name, phone, email, address)
            .await?;

        tracing::info!("createOwner concluído: ownerId={}", owner.id);
        Ok(owner)
    }

    pub async fn get_owner<'e, A>(&self, conn: A, id: Uuid) -> Result<Owner, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;
        self.registry_repo
            .find_owner(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Dono {} não encontrado.", id)))
    }

    pub async fn list_owners<'e, A>(
        &self,
        conn: A,
        page: i64,
        size: i64,
    ) -> Result<Page<Owner>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let (page, size) = sanitize_page(page, size);
        let mut conn = conn.acquire().await?;

        let total = self.registry_repo.count_owners(&mut *conn).await?;
        if total == 0 {
            return Ok(Page::empty(page, size));
        }

        let content = self
            .registry_repo
            .list_owners(&mut *conn, size, page * size)
            .await?;

        Ok(Page {
            content,
            page,
            size,
            total_elements: total,
        })
    }

    pub async fn apply_owner_action<'e, A>(
        &self,
        conn: A,
        id: Uuid,
        action: StatusAction,
    ) -> Result<Owner, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conn.begin().await?;

        let owner = self
            .registry_repo
            .find_owner(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Dono {} não encontrado.", id)))?;

        let updated = match action {
            StatusAction::Activate => {
                if owner.status == Status::Active {
                    return Err(AppError::DomainRule("O dono já está ativo.".into()));
                }
                self.registry_repo
                    .update_owner_status(&mut *tx, owner.id, Status::Active)
                    .await?
            }
            StatusAction::Deactivate => {
                if owner.status == Status::Inactive {
                    return Err(AppError::DomainRule("O dono já está inativo.".into()));
                }

                // Um dono com agendamento aberto não pode ser desativado.
                let open = AppointmentStatus::open_statuses();
                if self
                    .appointment_repo
                    .exists_open_for_owner(&mut *tx, owner.id, &open)
                    .await?
                {
                    tracing::warn!(
                        "applyOwnerAction bloqueado: agendamentos abertos. ownerId={}",
                        owner.id
                    );
                    return Err(AppError::DomainRule(
                        "O dono não pode ser desativado enquanto tiver agendamentos abertos.".into(),
                    ));
                }

                self.registry_repo
                    .update_owner_status(&mut *tx, owner.id, Status::Inactive)
                    .await?
            }
        };

        tx.commit().await?;

        tracing::info!(
            "applyOwnerAction concluído: ownerId={}, status={:?}",
            updated.id,
            updated.status
        );
        Ok(updated)
    }

    // --- PETS ---

    pub async fn create_pet<'e, A>(
        &self,
        conn: A,
        owner_id: Uuid,
        name: &str,
        size: PetSize,
        notes: Option<&str>,
    ) -> Result<Pet, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let owner = self
            .registry_repo
            .find_owner(&mut *conn, owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Dono {} não encontrado.", owner_id)))?;

        if owner.status == Status::Inactive {
            return Err(AppError::DomainRule(
                "Donos inativos não podem cadastrar pets.".into(),
            ));
        }

        let pet = self
            .registry_repo
            .create_pet(&mut *conn, owner.id, name, size, notes)
            .await?;

        tracing::info!("createPet concluído: petId={}, ownerId={}", pet.id, owner.id);
        Ok(pet)
    }

    pub async fn get_pet<'e, A>(&self, conn: A, id: Uuid) -> Result<Pet, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;
        self.registry_repo
            .find_pet(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pet {} não encontrado.", id)))
    }

    pub async fn list_pets<'e, A>(
        &self,
        conn: A,
        owner_id: Option<Uuid>,
        page: i64,
        size: i64,
    ) -> Result<Page<Pet>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let (page, size) = sanitize_page(page, size);
        let mut conn = conn.acquire().await?;

        let total = self.registry_repo.count_pets(&mut *conn, owner_id).await?;
        if total == 0 {
            return Ok(Page::empty(page, size));
        }

        let content = self
            .registry_repo
            .list_pets(&mut *conn, owner_id, size, page * size)
            .await?;

        Ok(Page {
            content,
            page,
            size,
            total_elements: total,
        })
    }

    // --- CATÁLOGO ---

    pub async fn create_catalog_entry<'e, A>(
        &self,
        conn: A,
        name: &str,
        description: Option<&str>,
        duration_minutes: i32,
        price_small: Decimal,
        price_medium: Decimal,
        price_large: Decimal,
    ) -> Result<CatalogEntry, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        // Um preço não-positivo em qualquer porte tornaria o item inutilizável
        // na agregação; rejeitamos na entrada.
        for price in [price_small, price_medium, price_large] {
            if price <= Decimal::ZERO {
                return Err(AppError::InvalidInput(
                    "Os preços do catálogo devem ser maiores que zero.".into(),
                ));
            }
        }

        if duration_minutes < 1 {
            return Err(AppError::InvalidInput(
                "A duração do serviço deve ser de pelo menos 1 minuto.".into(),
            ));
        }

        let mut conn = conn.acquire().await?;
        let entry = self
            .registry_repo
            .create_catalog_entry(
                &mut *conn,
                name,
                description,
                duration_minutes,
                price_small,
                price_medium,
                price_large,
            )
            .await?;

        tracing::info!("createCatalogEntry concluído: catalogId={}", entry.id);
        Ok(entry)
    }

    pub async fn get_catalog_entry<'e, A>(&self, conn: A, id: Uuid) -> Result<CatalogEntry, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;
        self.registry_repo
            .find_catalog_entry(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item de catálogo {} não encontrado.", id)))
    }

    pub async fn list_catalog<'e, A>(
        &self,
        conn: A,
        page: i64,
        size: i64,
    ) -> Result<Page<CatalogEntry>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let (page, size) = sanitize_page(page, size);
        let mut conn = conn.acquire().await?;

        let total = self.registry_repo.count_catalog(&mut *conn).await?;
        if total == 0 {
            return Ok(Page::empty(page, size));
        }

        let content = self
            .registry_repo
            .list_catalog(&mut *conn, size, page * size)
            .await?;

        Ok(Page {
            content,
            page,
            size,
            total_elements: total,
        })
    }

    pub async fn apply_catalog_action<'e, A>(
        &self,
        conn: A,
        id: Uuid,
        action: StatusAction,
    ) -> Result<CatalogEntry, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let entry = self
            .registry_repo
            .find_catalog_entry(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item de catálogo {} não encontrado.", id)))?;

        let target = match action {
            StatusAction::Activate => {
                if entry.status == Status::Active {
                    return Err(AppError::DomainRule("O item de catálogo já está ativo.".into()));
                }
                Status::Active
            }
            StatusAction::Deactivate => {
                if entry.status == Status::Inactive {
                    return Err(AppError::DomainRule(
                        "O item de catálogo já está inativo.".into(),
                    ));
                }
                Status::Inactive
            }
        };

        let updated = self
            .registry_repo
            .update_catalog_status(&mut *conn, entry.id, target)
            .await?;

        tracing::info!(
            "applyCatalogAction concluído: catalogId={}, status={:?}",
            updated.id,
            updated.status
        );
        Ok(updated)
    }
}
