// src/config.rs

use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{AppointmentRepository, PaymentRepository, RegistryRepository},
    services::{AppointmentService, PaymentService, RegistryService},
};

/// Taxa padrão de juros por parcela extra no cartão (2%).
const DEFAULT_CARD_INTEREST: Decimal = Decimal::from_parts(2, 0, 0, false, 2);

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub appointment_service: AppointmentService,
    pub payment_service: PaymentService,
    pub registry_service: RegistryService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Taxa de juros do cartão configurável via ambiente; negativa é
        // rejeitada depois, na hora do cálculo, como falha de configuração.
        let card_interest = match env::var("PAYMENT_CARD_INTEREST") {
            Ok(raw) => raw
                .parse::<Decimal>()
                .map_err(|e| anyhow::anyhow!("PAYMENT_CARD_INTEREST inválida: {}", e))?,
            Err(_) => DEFAULT_CARD_INTEREST,
        };

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let appointment_repo = AppointmentRepository::new(db_pool.clone());
        let payment_repo = PaymentRepository::new(db_pool.clone());
        let registry_repo = RegistryRepository::new(db_pool.clone());

        let appointment_service =
            AppointmentService::new(appointment_repo.clone(), registry_repo.clone());
        let payment_service = PaymentService::new(
            payment_repo,
            appointment_repo.clone(),
            registry_repo.clone(),
            card_interest,
        );
        let registry_service = RegistryService::new(registry_repo, appointment_repo);

        Ok(Self {
            db_pool,
            appointment_service,
            payment_service,
            registry_service,
        })
    }
}
