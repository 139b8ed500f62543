// src/models/appointment.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::{error::AppError, money};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "appointment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    InProgress,
    WaitingPayment,
    Completed,
    Canceled,
}

impl AppointmentStatus {
    /// Estados não-terminais: agendamentos "abertos" para fins de conflito de
    /// horário e de bloqueio de desativação do dono.
    pub fn open_statuses() -> Vec<AppointmentStatus> {
        vec![
            AppointmentStatus::Scheduled,
            AppointmentStatus::InProgress,
            AppointmentStatus::WaitingPayment,
        ]
    }
}

/// Ação de ciclo de vida solicitada pelo cliente da API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentAction {
    Start,
    CloseForPayment,
    Cancel,
}

// --- Structs ---

/// Agregado de agendamento. O estado só muda pelos métodos de transição
/// abaixo; nenhum campo é atribuível de fora deste módulo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub pet_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[schema(example = "150.50")]
    pub total_gross: Decimal,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Travado = aguardando pagamento ou concluído: não aceita novos itens,
    /// atualização de total nem novo fechamento.
    pub fn is_locked(&self) -> bool {
        matches!(
            self.status,
            AppointmentStatus::WaitingPayment | AppointmentStatus::Completed
        )
    }

    pub fn is_canceled(&self) -> bool {
        self.status == AppointmentStatus::Canceled
    }

    pub fn start(&mut self) -> Result<(), AppError> {
        if self.is_canceled() {
            return Err(AppError::DomainRule(
                "Agendamentos cancelados não podem ser iniciados.".into(),
            ));
        }
        if self.is_locked() {
            return Err(AppError::DomainRule(
                "Agendamentos aguardando pagamento ou concluídos não podem ser iniciados.".into(),
            ));
        }
        if self.status != AppointmentStatus::Scheduled {
            return Err(AppError::DomainRule(
                "Apenas agendamentos no estado SCHEDULED podem ser iniciados.".into(),
            ));
        }
        self.status = AppointmentStatus::InProgress;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), AppError> {
        match self.status {
            AppointmentStatus::WaitingPayment => Err(AppError::DomainRule(
                "Agendamentos aguardando pagamento não podem ser cancelados.".into(),
            )),
            AppointmentStatus::Completed => Err(AppError::DomainRule(
                "Agendamentos concluídos não podem ser cancelados.".into(),
            )),
            AppointmentStatus::Canceled => Err(AppError::DomainRule(
                "O agendamento já está cancelado.".into(),
            )),
            _ => {
                self.status = AppointmentStatus::Canceled;
                Ok(())
            }
        }
    }

    /// Fecha o agendamento para pagamento, congelando o total.
    pub fn close_for_payment(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        if self.is_canceled() {
            return Err(AppError::DomainRule(
                "Agendamentos cancelados não podem ser fechados para pagamento.".into(),
            ));
        }
        if self.is_locked() {
            return Err(AppError::DomainRule(
                "O agendamento já está aguardando pagamento ou concluído.".into(),
            ));
        }
        if self.total_gross <= Decimal::ZERO {
            return Err(AppError::DomainRule(
                "Agendamentos sem itens (total zerado) não podem ser fechados para pagamento.".into(),
            ));
        }
        self.status = AppointmentStatus::WaitingPayment;
        self.closed_at = Some(now);
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), AppError> {
        if self.status != AppointmentStatus::WaitingPayment {
            return Err(AppError::DomainRule(
                "Apenas agendamentos aguardando pagamento podem ser concluídos.".into(),
            ));
        }
        self.status = AppointmentStatus::Completed;
        Ok(())
    }

    /// Sempre chamado após a agregação de itens, nunca por entrada direta do
    /// usuário.
    pub fn update_total_gross(&mut self, total_gross: Decimal) -> Result<(), AppError> {
        if self.is_locked() {
            return Err(AppError::DomainRule(
                "O total de um agendamento travado não pode ser alterado.".into(),
            ));
        }
        if total_gross < Decimal::ZERO {
            return Err(AppError::DomainRule(
                "O total bruto não pode ser negativo.".into(),
            ));
        }
        self.total_gross = money::scale(total_gross);
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentItem {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub catalog_id: Uuid,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "50.00")]
    pub unit_price_applied: Decimal,
    #[schema(example = "100.00")]
    pub subtotal: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Item com o nome do serviço do catálogo, para o snapshot da API.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentItemDetail {
    pub id: Uuid,
    pub catalog_id: Uuid,
    #[schema(example = "Banho e tosa")]
    pub catalog_name: String,
    pub quantity: i32,
    #[schema(example = "50.00")]
    pub unit_price_applied: Decimal,
    #[schema(example = "100.00")]
    pub subtotal: Decimal,
}

/// Snapshot completo devolvido pela API: cabeçalho + itens.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub header: Appointment,
    pub items: Vec<AppointmentItemDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn scheduled(total: Decimal) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            pet_id: Uuid::new_v4(),
            scheduled_at: Utc::now(),
            status: AppointmentStatus::Scheduled,
            total_gross: total,
            closed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn start_only_from_scheduled() {
        let mut a = scheduled(dec!(0.00));
        assert!(a.start().is_ok());
        assert_eq!(a.status, AppointmentStatus::InProgress);

        // Segunda chamada falha: já está em andamento.
        assert!(matches!(a.start(), Err(AppError::DomainRule(_))));
    }

    #[test]
    fn close_for_payment_requires_positive_total() {
        let mut a = scheduled(dec!(0.00));
        assert!(matches!(
            a.close_for_payment(Utc::now()),
            Err(AppError::DomainRule(_))
        ));
        assert_eq!(a.status, AppointmentStatus::Scheduled);
        assert!(a.closed_at.is_none());
    }

    #[test]
    fn close_for_payment_freezes_and_locks() {
        let mut a = scheduled(dec!(80.00));
        let now = Utc::now();
        a.close_for_payment(now).unwrap();

        assert_eq!(a.status, AppointmentStatus::WaitingPayment);
        assert_eq!(a.closed_at, Some(now));
        assert!(a.is_locked());

        // Travado: rejeita novo fechamento e atualização de total.
        assert!(matches!(
            a.close_for_payment(Utc::now()),
            Err(AppError::DomainRule(_))
        ));
        assert!(matches!(
            a.update_total_gross(dec!(90.00)),
            Err(AppError::DomainRule(_))
        ));
    }

    #[test]
    fn cancel_rejects_second_call() {
        let mut a = scheduled(dec!(50.00));
        a.cancel().unwrap();
        assert_eq!(a.status, AppointmentStatus::Canceled);
        assert!(matches!(a.cancel(), Err(AppError::DomainRule(_))));
    }

    #[test]
    fn cancel_rejects_locked_states() {
        let mut a = scheduled(dec!(50.00));
        a.close_for_payment(Utc::now()).unwrap();
        assert!(matches!(a.cancel(), Err(AppError::DomainRule(_))));

        a.complete().unwrap();
        assert!(matches!(a.cancel(), Err(AppError::DomainRule(_))));
    }

    #[test]
    fn complete_only_from_waiting_payment() {
        let mut a = scheduled(dec!(50.00));
        assert!(matches!(a.complete(), Err(AppError::DomainRule(_))));

        a.close_for_payment(Utc::now()).unwrap();
        a.complete().unwrap();
        assert_eq!(a.status, AppointmentStatus::Completed);
    }

    #[test]
    fn canceled_appointment_rejects_everything() {
        let mut a = scheduled(dec!(50.00));
        a.cancel().unwrap();

        assert!(matches!(a.start(), Err(AppError::DomainRule(_))));
        assert!(matches!(
            a.close_for_payment(Utc::now()),
            Err(AppError::DomainRule(_))
        ));
        assert!(matches!(a.complete(), Err(AppError::DomainRule(_))));
    }

    #[test]
    fn update_total_gross_scales_value() {
        let mut a = scheduled(dec!(0.00));
        a.update_total_gross(dec!(10.005)).unwrap();
        assert_eq!(a.total_gross, dec!(10.01));

        assert!(matches!(
            a.update_total_gross(dec!(-1.00)),
            Err(AppError::DomainRule(_))
        ));
    }
}
