//! The `pratos` table and its record type.
use sqlx::{Connection, SqliteConnection};

use crate::orm::{FromRow, Model};

const SELECT_DISHES: &str = "SELECT id, nome, descricao, preco, disponivel FROM pratos";
const SELECT_DISH_BY_ID: &str =
    "SELECT id, nome, descricao, preco, disponivel FROM pratos WHERE id = ?";

/// A persisted dish. Column names are the Portuguese ones the table has always used.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Dish {
    pub id: i64,
    #[sqlx(rename = "nome")]
    pub name: String,
    #[sqlx(rename = "descricao")]
    pub description: Option<String>,
    #[sqlx(rename = "preco")]
    pub price: f64,
    #[sqlx(rename = "disponivel")]
    pub available: bool,
}

/// Values for a row that has not been inserted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDish {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub available: bool,
}

impl Model for Dish {
    fn table_name() -> &'static str {
        "pratos"
    }

    fn columns() -> Vec<(&'static str, &'static str)> {
        vec![
            // AUTOINCREMENT keeps sqlite from handing out the id of a deleted row again.
            ("id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            ("nome", "TEXT NOT NULL"),
            ("descricao", "TEXT"),
            ("preco", "REAL NOT NULL"),
            ("disponivel", "BOOLEAN NOT NULL DEFAULT 1"),
        ]
    }

    fn indexes() -> Vec<&'static str> {
        vec!["nome"]
    }
}

impl Dish {
    /// Insert `new` and reload it by the id sqlite assigned, in one transaction.
    pub async fn insert(conn: &mut SqliteConnection, new: &NewDish) -> Result<Dish, sqlx::Error> {
        let mut tx = conn.begin().await?;
        let id = sqlx::query(
            "INSERT INTO pratos (nome, descricao, preco, disponivel) VALUES (?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.available)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let dish = sqlx::query_as::<_, Dish>(SELECT_DISH_BY_ID)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        log::debug!("Inserted dish {}", dish.id);
        Ok(dish)
    }

    /// Every dish, in whatever order sqlite returns them.
    pub async fn all(conn: &mut SqliteConnection) -> Result<Vec<Dish>, sqlx::Error> {
        sqlx::query_as::<_, Dish>(SELECT_DISHES)
            .fetch_all(&mut *conn)
            .await
    }

    pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<Dish>, sqlx::Error> {
        sqlx::query_as::<_, Dish>(SELECT_DISH_BY_ID)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Returns `false` when no dish had this id.
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pratos WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
