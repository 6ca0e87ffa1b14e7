//! The four `/pratos` endpoints.
//!
//! Each handler opens its own [`Session`](crate::orm::Session), does one
//! operation and lets the session drop, whatever the outcome.
use std::collections::HashMap;

use serde::Serialize;

use crate::error::ApiError;
use crate::models::Dish;
use crate::router::{AppState, Request, Response, Router};
use crate::schemas::{CreateDish, DishView, Message, ValidationError};

pub const DELETED_MESSAGE: &str = "Prato deletado com sucesso";

/// Register every dish route on `router`.
pub fn register(router: &mut Router) {
    crate::route!(router,
        POST "/pratos" => create_dish,
        GET "/pratos" => list_dishes,
        GET "/pratos/:id" => get_dish,
        DELETE "/pratos/:id" => delete_dish,
    );
}

pub async fn create_dish(request: Request, state: AppState) -> Response {
    respond(create(request, state).await)
}

pub async fn list_dishes(_request: Request, state: AppState) -> Response {
    respond(list(state).await)
}

pub async fn get_dish(request: Request, state: AppState) -> Response {
    respond(get(request, state).await)
}

pub async fn delete_dish(request: Request, state: AppState) -> Response {
    respond(delete(request, state).await)
}

async fn create(request: Request, state: AppState) -> Result<DishView, ApiError> {
    let payload = CreateDish::from_json(&request.body)?;
    let mut session = state.db.session().await?;
    let dish = Dish::insert(&mut session, &payload.into()).await?;
    log::info!("Created dish {} ({})", dish.id, dish.name);
    Ok(dish.into())
}

async fn list(state: AppState) -> Result<Vec<DishView>, ApiError> {
    let mut session = state.db.session().await?;
    let dishes = Dish::all(&mut session).await?;
    Ok(dishes.into_iter().map(DishView::from).collect())
}

async fn get(request: Request, state: AppState) -> Result<DishView, ApiError> {
    let id = dish_id(&request)?;
    let mut session = state.db.session().await?;
    let dish = Dish::find(&mut session, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(dish.into())
}

async fn delete(request: Request, state: AppState) -> Result<Message, ApiError> {
    let id = dish_id(&request)?;
    let mut session = state.db.session().await?;
    if !Dish::delete(&mut session, id).await? {
        return Err(ApiError::NotFound);
    }
    log::info!("Deleted dish {}", id);
    Ok(Message {
        mensagem: DELETED_MESSAGE.to_string(),
    })
}

fn dish_id(request: &Request) -> Result<i64, ValidationError> {
    let raw = request.params.get("id").map(String::as_str).unwrap_or_default();
    raw.parse().map_err(|_| {
        ValidationError::new(
            &["path", "id"],
            format!("`{}` is not a valid integer", raw),
            "int_parsing",
        )
    })
}

fn respond<T: Serialize>(result: Result<T, ApiError>) -> Response {
    match result {
        Ok(body) => Response::json(body, 200, HashMap::new()),
        Err(e) => e.into(),
    }
}
