pub mod error;
pub mod handlers;
pub mod models;
pub mod orm;
pub mod router;
pub mod schemas;
pub mod settings;

use std::sync::Arc;
use std::time::Instant;

use crate::models::Dish;
use crate::orm::{Db, Model};
use crate::router::{AppState, Router};
use crate::settings::Settings;

/// Connect to the store, create the `pratos` table if needed and return a
/// router with every endpoint and the request log middleware registered.
pub async fn build_app(settings: Settings) -> Result<Router, sqlx::Error> {
    let db = Db::connect_with(&settings.database).await?;
    Dish::create_table(&db).await?;

    let mut router = Router::new();
    router.add_middleware(|ctx| {
        ctx.start_time = Some(Instant::now());
        None
    });
    router.add_post_middleware(|ctx, response| {
        let elapsed = ctx.start_time.map(|t| t.elapsed()).unwrap_or_default();
        log::info!(
            "{} {} -> {} ({:?})",
            ctx.method,
            ctx.path,
            response.status_code,
            elapsed
        );
        response
    });
    handlers::register(&mut router);
    router.set_app_state(AppState {
        db: Arc::new(db),
        settings,
    });
    Ok(router)
}
