// src/services/appointment_service.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, money},
    db::{AppointmentRepository, RegistryRepository},
    handlers::appointments::AppointmentItemPayload,
    models::{
        appointment::{
            Appointment, AppointmentAction, AppointmentDetail, AppointmentStatus,
        },
        page::Page,
        registry::{Pet, Status},
    },
};

#[derive(Clone)]
pub struct AppointmentService {
    appointment_repo: AppointmentRepository,
    registry_repo: RegistryRepository,
}

impl AppointmentService {
    pub fn new(appointment_repo: AppointmentRepository, registry_repo: RegistryRepository) -> Self {
        Self {
            appointment_repo,
            registry_repo,
        }
    }

    // --- CRIAÇÃO ---

    pub async fn create_appointment<'e, A>(
        &self,
        conn: A,
        owner_id: Uuid,
        pet_id: Uuid,
        scheduled_at: DateTime<Utc>,
        items: &[AppointmentItemPayload],
    ) -> Result<AppointmentDetail, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        tracing::info!(
            "createAppointment iniciado: ownerId={}, petId={}, scheduledAt={}, itens={}",
            owner_id,
            pet_id,
            scheduled_at,
            items.len()
        );

        let mut tx = conn.begin().await?;

        let owner = self
            .registry_repo
            .find_owner(&mut *tx, owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Dono {} não encontrado.", owner_id)))?;

        if owner.status == Status::Inactive {
            tracing::warn!("createAppointment bloqueado: dono inativo. ownerId={}", owner.id);
            return Err(AppError::DomainRule(
                "Donos inativos não podem criar agendamentos.".into(),
            ));
        }

        let pet = self
            .registry_repo
            .find_pet(&mut *tx, pet_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pet {} não encontrado.", pet_id)))?;

        if pet.owner_id != owner.id {
            tracing::warn!(
                "createAppointment bloqueado: pet não pertence ao dono. ownerId={}, petId={}",
                owner.id,
                pet.id
            );
            return Err(AppError::DomainRule(
                "O pet informado não pertence ao dono informado.".into(),
            ));
        }

        if scheduled_at < Utc::now() {
            return Err(AppError::DomainRule(
                "A data/hora do agendamento não pode estar no passado.".into(),
            ));
        }

        if items.is_empty() {
            return Err(AppError::InvalidInput(
                "Pelo menos um item de serviço deve ser informado.".into(),
            ));
        }

        // Conflito de horário: o mesmo pet não pode ter outro agendamento
        // aberto exatamente no mesmo horário. O índice único parcial no banco
        // cobre a janela entre esta checagem e o commit.
        let open = AppointmentStatus::open_statuses();
        let has_conflict = self
            .appointment_repo
            .exists_for_pet_at(&mut *tx, pet.id, scheduled_at, &open)
            .await?;

        if has_conflict {
            tracing::warn!(
                "createAppointment bloqueado: conflito de horário. petId={}, scheduledAt={}",
                pet.id,
                scheduled_at
            );
            return Err(AppError::DomainRule(
                "Este pet já tem um agendamento para a mesma data/hora.".into(),
            ));
        }

        let mut appointment = self
            .appointment_repo
            .create(&mut *tx, owner.id, pet.id, scheduled_at)
            .await?;

        self.build_and_insert_items(&mut tx, &appointment, &pet, items)
            .await?;

        self.recompute_total(&mut tx, &mut appointment).await?;
        let saved = self.appointment_repo.save(&mut *tx, &appointment).await?;
        let item_details = self
            .appointment_repo
            .list_item_details(&mut *tx, saved.id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "createAppointment concluído: appointmentId={}, status={:?}, totalGross={}, itens={}",
            saved.id,
            saved.status,
            saved.total_gross,
            item_details.len()
        );

        Ok(AppointmentDetail {
            header: saved,
            items: item_details,
        })
    }

    // --- ADIÇÃO DE ITENS ---

    pub async fn add_items<'e, A>(
        &self,
        conn: A,
        appointment_id: Uuid,
        items: &[AppointmentItemPayload],
    ) -> Result<AppointmentDetail, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        tracing::info!(
            "addAppointmentItems iniciado: appointmentId={}, novosItens={}",
            appointment_id,
            items.len()
        );

        if items.is_empty() {
            return Err(AppError::InvalidInput(
                "Pelo menos um item de serviço deve ser informado.".into(),
            ));
        }

        let mut tx = conn.begin().await?;

        // Aquisição exclusiva: serializa adições de itens concorrentes e
        // adições disputando com transições/pagamentos no mesmo agendamento.
        let mut appointment = self
            .appointment_repo
            .find_by_id_for_update(&mut *tx, appointment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Agendamento {} não encontrado.", appointment_id))
            })?;

        if appointment.is_canceled() {
            return Err(AppError::DomainRule(
                "Agendamentos cancelados não podem ser modificados.".into(),
            ));
        }

        if appointment.is_locked() {
            tracing::warn!(
                "addAppointmentItems bloqueado: agendamento travado. appointmentId={}, status={:?}",
                appointment.id,
                appointment.status
            );
            return Err(AppError::DomainRule(
                "Agendamentos aguardando pagamento ou concluídos não podem ser modificados.".into(),
            ));
        }

        self.ensure_owner_active(&mut tx, appointment.owner_id).await?;

        let pet = self
            .registry_repo
            .find_pet(&mut *tx, appointment.pet_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Pet {} não encontrado.", appointment.pet_id))
            })?;

        self.build_and_insert_items(&mut tx, &appointment, &pet, items)
            .await?;

        self.recompute_total(&mut tx, &mut appointment).await?;
        let saved = self.appointment_repo.save(&mut *tx, &appointment).await?;
        let item_details = self
            .appointment_repo
            .list_item_details(&mut *tx, saved.id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "addAppointmentItems concluído: appointmentId={}, totalGross={}, totalItens={}",
            saved.id,
            saved.total_gross,
            item_details.len()
        );

        Ok(AppointmentDetail {
            header: saved,
            items: item_details,
        })
    }

    // --- TRANSIÇÕES DE CICLO DE VIDA ---

    pub async fn apply_action<'e, A>(
        &self,
        conn: A,
        appointment_id: Uuid,
        action: AppointmentAction,
    ) -> Result<AppointmentDetail, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        tracing::info!(
            "applyAppointmentAction iniciado: appointmentId={}, action={:?}",
            appointment_id,
            action
        );

        let mut tx = conn.begin().await?;

        let mut appointment = self
            .appointment_repo
            .find_by_id_for_update(&mut *tx, appointment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Agendamento {} não encontrado.", appointment_id))
            })?;

        self.ensure_owner_active(&mut tx, appointment.owner_id).await?;

        let before = appointment.status;

        match action {
            AppointmentAction::Start => appointment.start()?,
            AppointmentAction::CloseForPayment => appointment.close_for_payment(Utc::now())?,
            AppointmentAction::Cancel => appointment.cancel()?,
        }

        let saved = self.appointment_repo.save(&mut *tx, &appointment).await?;
        let item_details = self
            .appointment_repo
            .list_item_details(&mut *tx, saved.id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "applyAppointmentAction concluído: appointmentId={}, action={:?}, de={:?}, para={:?}",
            saved.id,
            action,
            before,
            saved.status
        );

        Ok(AppointmentDetail {
            header: saved,
            items: item_details,
        })
    }

    // --- LEITURAS (sem lock; um total levemente defasado é aceitável) ---

    pub async fn find_by_id<'e, A>(
        &self,
        conn: A,
        appointment_id: Uuid,
    ) -> Result<AppointmentDetail, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let appointment = self
            .appointment_repo
            .find_by_id(&mut *conn, appointment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Agendamento {} não encontrado.", appointment_id))
            })?;

        let items = self
            .appointment_repo
            .list_item_details(&mut *conn, appointment.id)
            .await?;

        Ok(AppointmentDetail {
            header: appointment,
            items,
        })
    }

    pub async fn list_future<'e, A>(
        &self,
        conn: A,
        status: Option<AppointmentStatus>,
        page: i64,
        size: i64,
    ) -> Result<Page<AppointmentDetail>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let statuses = match status {
            None => AppointmentStatus::open_statuses(),
            Some(s) => {
                if matches!(s, AppointmentStatus::Canceled | AppointmentStatus::Completed) {
                    return Err(AppError::InvalidInput(
                        "O filtro de status para agendamentos futuros deve ser um status aberto."
                            .into(),
                    ));
                }
                vec![s]
            }
        };

        let (page, size) = sanitize_page(page, size);
        let mut conn = conn.acquire().await?;
        let now = Utc::now();

        let total = self
            .appointment_repo
            .count_future(&mut *conn, now, &statuses)
            .await?;

        if total == 0 {
            return Ok(Page::empty(page, size));
        }

        let appointments = self
            .appointment_repo
            .list_future(&mut *conn, now, &statuses, size, page * size)
            .await?;

        let content = self.assemble_details(&mut *conn, appointments).await?;

        Ok(Page {
            content,
            page,
            size,
            total_elements: total,
        })
    }

    pub async fn list_history<'e, A>(
        &self,
        conn: A,
        status: Option<AppointmentStatus>,
        page: i64,
        size: i64,
    ) -> Result<Page<AppointmentDetail>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let statuses = match status {
            Some(s) => vec![s],
            None => vec![
                AppointmentStatus::Scheduled,
                AppointmentStatus::InProgress,
                AppointmentStatus::WaitingPayment,
                AppointmentStatus::Completed,
                AppointmentStatus::Canceled,
            ],
        };

        let (page, size) = sanitize_page(page, size);
        let mut conn = conn.acquire().await?;
        let now = Utc::now();

        let total = self
            .appointment_repo
            .count_history(&mut *conn, now, &statuses)
            .await?;

        if total == 0 {
            return Ok(Page::empty(page, size));
        }

        let appointments = self
            .appointment_repo
            .list_history(&mut *conn, now, &statuses, size, page * size)
            .await?;

        let content = self.assemble_details(&mut *conn, appointments).await?;

        Ok(Page {
            content,
            page,
            size,
            total_elements: total,
        })
    }

    // --- HELPERS ---

    async fn ensure_owner_active(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        owner_id: Uuid,
    ) -> Result<(), AppError> {
        let owner = self
            .registry_repo
            .find_owner(&mut **tx, owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Dono {} não encontrado.", owner_id)))?;

        if owner.status == Status::Inactive {
            tracing::warn!("operação bloqueada: dono inativo. ownerId={}", owner.id);
            return Err(AppError::DomainRule(
                "Agendamentos de donos inativos não podem ser alterados.".into(),
            ));
        }

        Ok(())
    }

    /// Valida e insere cada item solicitado com o preço do catálogo congelado
    /// para o porte do pet.
    async fn build_and_insert_items(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        appointment: &Appointment,
        pet: &Pet,
        forms: &[AppointmentItemPayload],
    ) -> Result<(), AppError> {
        for form in forms {
            if form.quantity < 1 {
                return Err(AppError::InvalidInput(
                    "A quantidade deve ser no mínimo 1.".into(),
                ));
            }

            let catalog = self
                .registry_repo
                .find_catalog_entry(&mut **tx, form.catalog_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Item de catálogo {} não encontrado.",
                        form.catalog_id
                    ))
                })?;

            if catalog.status == Status::Inactive {
                tracing::warn!(
                    "item bloqueado: serviço inativo. catalogId={}, appointmentId={}",
                    catalog.id,
                    appointment.id
                );
                return Err(AppError::DomainRule(
                    "Itens de catálogo inativos não podem ser usados.".into(),
                ));
            }

            let unit_price = money::scale(catalog.price_for_size(pet.size));
            if unit_price <= Decimal::ZERO {
                // Preço não-positivo é catálogo mal configurado, não erro do
                // cliente.
                return Err(AppError::DomainRule(format!(
                    "Preço de catálogo inválido para o porte do pet (catalogId={}).",
                    catalog.id
                )));
            }

            let subtotal = money::line_subtotal(unit_price, form.quantity);

            self.appointment_repo
                .insert_item(
                    &mut **tx,
                    appointment.id,
                    catalog.id,
                    form.quantity,
                    unit_price,
                    subtotal,
                )
                .await?;
        }

        Ok(())
    }

    /// Recalcula o total a partir do conjunto COMPLETO de itens do
    /// agendamento (não só os recém-inseridos): auto-corrige qualquer
    /// anomalia de escrita parcial ou submissão duplicada.
    async fn recompute_total(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        appointment: &mut Appointment,
    ) -> Result<(), AppError> {
        let all_items = self
            .appointment_repo
            .list_items(&mut **tx, appointment.id)
            .await?;

        let total = money::scale(
            all_items
                .iter()
                .fold(money::zero(), |acc, item| acc + item.subtotal),
        );

        appointment.update_total_gross(total)
    }

    async fn assemble_details(
        &self,
        conn: &mut PgConnection,
        appointments: Vec<Appointment>,
    ) -> Result<Vec<AppointmentDetail>, AppError> {
        let ids: Vec<Uuid> = appointments.iter().map(|a| a.id).collect();
        let rows = self
            .appointment_repo
            .list_item_details_for(&mut *conn, &ids)
            .await?;

        let mut by_appointment: HashMap<Uuid, Vec<_>> = HashMap::new();
        for (appointment_id, item) in rows {
            by_appointment.entry(appointment_id).or_default().push(item);
        }

        Ok(appointments
            .into_iter()
            .map(|a| {
                let items = by_appointment.remove(&a.id).unwrap_or_default();
                AppointmentDetail { header: a, items }
            })
            .collect())
    }
}

/// Teto de página: mantém `page * size` dentro de `i64` para o OFFSET.
const MAX_PAGE: i64 = 1_000_000;

pub(crate) fn sanitize_page(page: i64, size: i64) -> (i64, i64) {
    let page = page.clamp(0, MAX_PAGE);
    let size = size.clamp(1, 100);
    (page, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sanitize_page_clamps_bounds() {
        assert_eq!(sanitize_page(-1, 0), (0, 1));
        assert_eq!(sanitize_page(2, 500), (2, 100));
        assert_eq!(sanitize_page(0, 20), (0, 20));
        assert_eq!(sanitize_page(i64::MAX, 20), (MAX_PAGE, 20));
    }

    #[test]
    fn sanitized_offset_never_overflows() {
        let (page, size) = sanitize_page(i64::MAX, i64::MAX);
        assert!(page.checked_mul(size).is_some());
    }

    #[test]
    fn total_is_rounded_sum_of_subtotals() {
        // Propriedade: total = scale(soma dos subtotais já arredondados).
        let subtotals = [dec!(33.34), dec!(33.33), dec!(33.33)];
        let total = money::scale(subtotals.iter().fold(money::zero(), |acc, s| acc + s));
        assert_eq!(total, dec!(100.00));
    }
}
