//! Catalogue: CRUD over the `catalogo` table.
//!
//! Listings are prepared for display: the stored 0/1 flag becomes a boolean and
//! the image filename is prefixed with the public image directory. Single-entry
//! fetches return the stored filename untouched so the edit form round-trips it.

use std::sync::Arc;

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

use crate::db::StoreError;
use crate::ids::{insert_with_fresh_id, Collection, IdSource};

pub const DEFAULT_IMAGE_PREFIX: &str = "../images/pages/catalogue/";

/// A catalogue entry as shown to visitors and in the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogueEntry {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub description: String,
    pub acclaimed: bool,
}

/// Fields supplied by the admin when creating or replacing an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFields {
    pub name: String,
    pub image: String,
    pub description: String,
    pub acclaimed: bool,
}

#[derive(Debug, FromRow)]
struct EntryRow {
    id: i64,
    name: String,
    image: String,
    description: String,
    acclaimed: i64,
}

impl EntryRow {
    fn into_entry(self, image_prefix: &str) -> CatalogueEntry {
        CatalogueEntry {
            id: self.id,
            name: self.name,
            image: format!("{image_prefix}{}", self.image),
            description: self.description,
            acclaimed: self.acclaimed == 1,
        }
    }
}

const SELECT_ALL: &str = "SELECT id, nombre AS name, img AS image, descripcion AS description, \
    aclamado AS acclaimed FROM catalogo";
const SELECT_ONE: &str = "SELECT id, nombre AS name, img AS image, descripcion AS description, \
    aclamado AS acclaimed FROM catalogo WHERE id = ?";
const INSERT: &str =
    "INSERT INTO catalogo (id, nombre, img, descripcion, aclamado) VALUES (?, ?, ?, ?, ?)";
const UPDATE: &str =
    "UPDATE catalogo SET nombre = ?, img = ?, descripcion = ?, aclamado = ? WHERE id = ?";
const DELETE: &str = "DELETE FROM catalogo WHERE id = ?";

#[derive(Debug, Clone)]
pub struct CatalogueStore {
    pool: SqlitePool,
    ids: Arc<dyn IdSource>,
    image_prefix: Arc<str>,
}

impl CatalogueStore {
    pub fn new(pool: SqlitePool, ids: Arc<dyn IdSource>, image_prefix: &str) -> Self {
        Self {
            pool,
            ids,
            image_prefix: Arc::from(image_prefix),
        }
    }

    pub async fn list(&self) -> Result<Vec<CatalogueEntry>, StoreError> {
        let rows = sqlx::query_as::<_, EntryRow>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await?;
        debug!(entries = rows.len(), "catalogue listed");
        Ok(rows
            .into_iter()
            .map(|row| row.into_entry(&self.image_prefix))
            .collect())
    }

    /// Insert a new entry under a freshly allocated id and return that id.
    pub async fn create(&self, fields: &EntryFields) -> Result<i64, StoreError> {
        let pool = &self.pool;
        let id = insert_with_fresh_id(self.ids.as_ref(), Collection::Catalogue, |id| {
            sqlx::query(INSERT)
                .bind(id)
                .bind(fields.name.clone())
                .bind(fields.image.clone())
                .bind(fields.description.clone())
                .bind(i64::from(fields.acclaimed))
                .execute(pool)
        })
        .await?;
        info!(id, name = %fields.name, "catalogue entry created");
        Ok(id)
    }

    /// Replace every field of `id`. A missing row is not an error.
    pub async fn update(&self, id: i64, fields: &EntryFields) -> Result<(), StoreError> {
        sqlx::query(UPDATE)
            .bind(fields.name.as_str())
            .bind(fields.image.as_str())
            .bind(fields.description.as_str())
            .bind(i64::from(fields.acclaimed))
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!(id, "catalogue entry updated");
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query(DELETE).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            debug!(id, "no catalogue entry to delete");
            return Err(StoreError::NotFound);
        }
        info!(id, "catalogue entry deleted");
        Ok(())
    }

    /// Stored entry for the edit form; the image is the bare filename.
    pub async fn fetch(&self, id: i64) -> Result<CatalogueEntry, StoreError> {
        let row = sqlx::query_as::<_, EntryRow>(SELECT_ONE)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(row.into_entry(""))
    }
}
