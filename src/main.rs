//src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let appointment_routes = Router::new()
        .route(
            "/",
            post(handlers::appointments::create_appointment),
        )
        .route("/future", get(handlers::appointments::list_future))
        .route("/history", get(handlers::appointments::list_history))
        .route("/{id}", get(handlers::appointments::find_by_id))
        .route("/{id}/items", post(handlers::appointments::add_items))
        .route("/{id}/actions", post(handlers::appointments::apply_action))
        .route("/{id}/payments", post(handlers::payments::register_payment));

    let owner_routes = Router::new()
        .route(
            "/",
            post(handlers::registry::create_owner).get(handlers::registry::list_owners),
        )
        .route("/{id}", get(handlers::registry::get_owner))
        .route("/{id}/actions", post(handlers::registry::apply_owner_action));

    let pet_routes = Router::new()
        .route(
            "/",
            post(handlers::registry::create_pet).get(handlers::registry::list_pets),
        )
        .route("/{id}", get(handlers::registry::get_pet));

    let catalog_routes = Router::new()
        .route(
            "/",
            post(handlers::registry::create_catalog_entry).get(handlers::registry::list_catalog),
        )
        .route("/{id}", get(handlers::registry::get_catalog_entry))
        .route("/{id}/actions", post(handlers::registry::apply_catalog_action));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/appointments", appointment_routes)
        .nest("/api/owners", owner_routes)
        .nest("/api/pets", pet_routes)
        .nest("/api/catalog", catalog_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
