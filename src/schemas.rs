//! Request and response payloads.
//!
//! These are deliberately separate from [`crate::models::Dish`]: clients never
//! send an `id`, and every response is mapped from a stored row.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Dish, NewDish};

/// Body of `POST /pratos`.
///
/// The original Portuguese field names are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateDish {
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(default, alias = "descricao")]
    pub description: Option<String>,
    #[serde(alias = "preco")]
    pub price: f64,
    #[serde(default = "default_available", alias = "disponivel")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl CreateDish {
    /// Parse and validate a raw JSON request body.
    pub fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
        serde_json::from_slice(body).map_err(ValidationError::from)
    }
}

impl From<CreateDish> for NewDish {
    fn from(req: CreateDish) -> Self {
        NewDish {
            name: req.name,
            description: req.description,
            price: req.price,
            available: req.available,
        }
    }
}

/// A dish as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishView {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub available: bool,
}

impl From<Dish> for DishView {
    fn from(dish: Dish) -> Self {
        DishView {
            id: dish.id,
            name: dish.name,
            description: dish.description,
            price: dish.price,
            available: dish.available,
        }
    }
}

/// `{"mensagem": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub mensagem: String,
}

/// `{"detail": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

/// One rejected input, serialized as a `detail` entry: `{"loc", "msg", "type"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{msg}")]
pub struct ValidationError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ValidationError {
    pub fn new(loc: &[&str], msg: impl Into<String>, kind: impl Into<String>) -> Self {
        ValidationError {
            loc: loc.iter().map(|part| part.to_string()).collect(),
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        let msg = err.to_string();
        let kind = match err.classify() {
            Category::Data => "value_error",
            Category::Syntax | Category::Eof | Category::Io => "json_invalid",
        };
        // serde only names the field when it is missing: "missing field `name` at ..."
        let field = msg
            .strip_prefix("missing field `")
            .and_then(|rest| rest.split('`').next())
            .map(str::to_string);
        let kind = if field.is_some() { "missing" } else { kind };

        let mut loc = vec!["body".to_string()];
        loc.extend(field);
        ValidationError {
            loc,
            msg,
            kind: kind.to_string(),
        }
    }
}
