// src/services/payment_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, money},
    db::{AppointmentRepository, PaymentRepository, RegistryRepository},
    models::{
        appointment::AppointmentStatus,
        payment::{Payment, PaymentMethod, PaymentStatus},
        registry::Status,
    },
};

/// Desconto fixo de 5% para pagamento instantâneo (CASH/PIX).
const INSTANT_PAYMENT_FACTOR: Decimal = Decimal::from_parts(95, 0, 0, false, 2);

/// Parcelamento de cartão: até 2 parcelas sem juros.
const FREE_INSTALLMENTS: i32 = 2;

#[derive(Clone)]
pub struct PaymentService {
    payment_repo: PaymentRepository,
    appointment_repo: AppointmentRepository,
    registry_repo: RegistryRepository,
    /// Taxa de juros por parcela extra (configurada; padrão 0.02).
    interest_per_extra_installment: Decimal,
}

impl PaymentService {
    pub fn new(
        payment_repo: PaymentRepository,
        appointment_repo: AppointmentRepository,
        registry_repo: RegistryRepository,
        interest_per_extra_installment: Decimal,
    ) -> Self {
        Self {
            payment_repo,
            appointment_repo,
            registry_repo,
            interest_per_extra_installment,
        }
    }

    /// Registra um pagamento já aprovado e conclui o agendamento na mesma
    /// transação, sob a mesma aquisição exclusiva: nenhuma outra mutação pode
    /// observar WAITING_PAYMENT com pagamento anexado sem que o agendamento
    /// também esteja COMPLETED.
    pub async fn register_payment<'e, A>(
        &self,
        conn: A,
        appointment_id: Uuid,
        method: PaymentMethod,
        installments: Option<i32>,
    ) -> Result<Payment, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        tracing::info!(
            "registerPayment iniciado: appointmentId={}, method={:?}, installments={:?}",
            appointment_id,
            method,
            installments
        );

        let mut tx = conn.begin().await?;

        let mut appointment = self
            .appointment_repo
            .find_by_id_for_update(&mut *tx, appointment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Agendamento {} não encontrado.", appointment_id))
            })?;

        if appointment.status != AppointmentStatus::WaitingPayment {
            tracing::warn!(
                "registerPayment bloqueado: status inválido. appointmentId={}, status={:?}",
                appointment.id,
                appointment.status
            );
            return Err(AppError::DomainRule(
                "O pagamento só pode ser registrado quando o agendamento está aguardando pagamento."
                    .into(),
            ));
        }

        if self
            .payment_repo
            .exists_approved_for_appointment(&mut *tx, appointment.id)
            .await?
        {
            return Err(AppError::DomainRule(
                "Este agendamento já possui um pagamento aprovado.".into(),
            ));
        }

        let owner = self
            .registry_repo
            .find_owner(&mut *tx, appointment.owner_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Dono {} não encontrado.", appointment.owner_id))
            })?;

        if owner.status == Status::Inactive {
            return Err(AppError::DomainRule(
                "Agendamentos de donos inativos não podem ser pagos.".into(),
            ));
        }

        let installments = resolve_installments(method, installments)?;
        let final_amount = calculate_final_amount(
            appointment.total_gross,
            method,
            installments,
            self.interest_per_extra_installment,
        )?;

        let payment = self
            .payment_repo
            .insert(
                &mut *tx,
                appointment.id,
                method,
                PaymentStatus::Approved,
                installments,
                final_amount,
            )
            .await?;

        appointment.complete()?;
        self.appointment_repo.save(&mut *tx, &appointment).await?;

        tx.commit().await?;

        tracing::info!(
            "registerPayment concluído: paymentId={}, appointmentId={}, finalAmount={}",
            payment.id,
            payment.appointment_id,
            payment.final_amount
        );

        Ok(payment)
    }
}

/// CARD exige o número de parcelas (1 a 6); CASH/PIX aceitam ausente ou
/// exatamente 1.
pub fn resolve_installments(
    method: PaymentMethod,
    installments: Option<i32>,
) -> Result<i32, AppError> {
    if method == PaymentMethod::Card {
        let n = installments.ok_or_else(|| {
            AppError::InvalidInput("O número de parcelas é obrigatório para pagamento com cartão.".into())
        })?;
        if !(1..=6).contains(&n) {
            return Err(AppError::InvalidInput(
                "O número de parcelas deve estar entre 1 e 6.".into(),
            ));
        }
        return Ok(n);
    }

    match installments {
        None | Some(1) => Ok(1),
        Some(_) => Err(AppError::InvalidInput(
            "Pagamentos em dinheiro ou PIX não podem ser parcelados.".into(),
        )),
    }
}

/// Valor final cobrado:
///  - CASH/PIX: total x 0.95 (desconto de pagamento instantâneo);
///  - CARD até 2 parcelas: total sem acréscimo;
///  - CARD acima de 2: total x (1 + taxa x (parcelas - 2)).
/// O arredondamento (half-up, 2 casas) é aplicado uma única vez ao final de
/// cada fórmula.
pub fn calculate_final_amount(
    total_gross: Decimal,
    method: PaymentMethod,
    installments: i32,
    rate: Decimal,
) -> Result<Decimal, AppError> {
    if total_gross <= Decimal::ZERO {
        return Err(AppError::DomainRule(
            "O total bruto do agendamento é inválido para pagamento.".into(),
        ));
    }

    let gross = money::scale(total_gross);

    if method.is_instant() {
        return Ok(money::scale(gross * INSTANT_PAYMENT_FACTOR));
    }

    // CARD
    if installments <= FREE_INSTALLMENTS {
        return Ok(money::scale(gross));
    }

    if rate < Decimal::ZERO {
        return Err(AppError::DomainRule(
            "Taxa de juros de cartão mal configurada.".into(),
        ));
    }

    let multiplier = Decimal::ONE + rate * Decimal::from(installments - FREE_INSTALLMENTS);
    Ok(money::scale(gross * multiplier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn instant_methods_get_flat_discount() {
        let amount = calculate_final_amount(dec!(100.00), PaymentMethod::Pix, 1, dec!(0.02)).unwrap();
        assert_eq!(amount, dec!(95.00));

        let amount = calculate_final_amount(dec!(100.00), PaymentMethod::Cash, 1, dec!(0.02)).unwrap();
        assert_eq!(amount, dec!(95.00));
    }

    #[test]
    fn card_up_to_two_installments_has_no_surcharge() {
        let amount = calculate_final_amount(dec!(100.00), PaymentMethod::Card, 2, dec!(0.02)).unwrap();
        assert_eq!(amount, dec!(100.00));

        let amount = calculate_final_amount(dec!(100.00), PaymentMethod::Card, 1, dec!(0.02)).unwrap();
        assert_eq!(amount, dec!(100.00));
    }

    #[test]
    fn card_surcharge_is_linear_per_extra_installment() {
        // 100 x (1 + 0.02 x (4 - 2)) = 104.00
        let amount = calculate_final_amount(dec!(100.00), PaymentMethod::Card, 4, dec!(0.02)).unwrap();
        assert_eq!(amount, dec!(104.00));

        let amount = calculate_final_amount(dec!(100.00), PaymentMethod::Card, 6, dec!(0.02)).unwrap();
        assert_eq!(amount, dec!(108.00));
    }

    #[test]
    fn rounding_happens_once_at_the_end() {
        // 33.33 x 0.95 = 31.6635 -> 31.66 (half-up)
        let amount = calculate_final_amount(dec!(33.33), PaymentMethod::Pix, 1, dec!(0.02)).unwrap();
        assert_eq!(amount, dec!(31.66));

        // 99.99 x 1.06 = 105.9894 -> 105.99
        let amount = calculate_final_amount(dec!(99.99), PaymentMethod::Card, 5, dec!(0.02)).unwrap();
        assert_eq!(amount, dec!(105.99));
    }

    #[test]
    fn non_positive_gross_is_rejected() {
        assert!(matches!(
            calculate_final_amount(dec!(0.00), PaymentMethod::Pix, 1, dec!(0.02)),
            Err(AppError::DomainRule(_))
        ));
        assert!(matches!(
            calculate_final_amount(dec!(-10.00), PaymentMethod::Card, 1, dec!(0.02)),
            Err(AppError::DomainRule(_))
        ));
    }

    #[test]
    fn negative_rate_is_a_configuration_fault() {
        assert!(matches!(
            calculate_final_amount(dec!(100.00), PaymentMethod::Card, 3, dec!(-0.01)),
            Err(AppError::DomainRule(_))
        ));
    }

    #[test]
    fn card_requires_explicit_installments() {
        assert!(matches!(
            resolve_installments(PaymentMethod::Card, None),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            resolve_installments(PaymentMethod::Card, Some(0)),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            resolve_installments(PaymentMethod::Card, Some(7)),
            Err(AppError::InvalidInput(_))
        ));
        assert_eq!(resolve_installments(PaymentMethod::Card, Some(6)).unwrap(), 6);
    }

    #[test]
    fn instant_methods_accept_only_single_installment() {
        assert_eq!(resolve_installments(PaymentMethod::Pix, None).unwrap(), 1);
        assert_eq!(resolve_installments(PaymentMethod::Cash, Some(1)).unwrap(), 1);
        assert!(matches!(
            resolve_installments(PaymentMethod::Pix, Some(2)),
            Err(AppError::InvalidInput(_))
        ));
    }
}
