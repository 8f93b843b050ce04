//! # Client Repository

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use wrench_core::edit::ClientEdit;
use wrench_core::{Client, CoreError};

use super::bind_value;
use crate::error::DbResult;

#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: String,
    first_name: String,
    last_name: String,
    address: String,
    postal_code: String,
    phone: String,
    email: String,
    email_consent: bool,
    year_of_birth: Option<i32>,
    internal_notes: String,
    membership_paid_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    archived: bool,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            address: row.address,
            postal_code: row.postal_code,
            phone: row.phone,
            email: row.email,
            email_consent: row.email_consent,
            year_of_birth: row.year_of_birth,
            internal_notes: row.internal_notes,
            membership_paid_until: row.membership_paid_until,
            created_at: row.created_at,
            updated_at: row.updated_at,
            archived: row.archived,
        }
    }
}

/// Fails with `NotFound` unless the client exists.
pub(crate) async fn ensure_client_exists(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    let found: Option<String> = sqlx::query_scalar("SELECT id FROM clients WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match found {
        Some(_) => Ok(()),
        None => Err(CoreError::not_found("client", id).into()),
    }
}

/// Repository for client operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    pub async fn create(&self, client: &Client) -> DbResult<()> {
        debug!(id = %client.id, "Inserting client");

        sqlx::query(
            r#"
            INSERT INTO clients (
                id, first_name, last_name, address, postal_code, phone, email,
                email_consent, year_of_birth, internal_notes, membership_paid_until,
                created_at, updated_at, archived
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&client.id)
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.address)
        .bind(&client.postal_code)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(client.email_consent)
        .bind(client.year_of_birth)
        .bind(&client.internal_notes)
        .bind(client.membership_paid_until)
        .bind(client.created_at)
        .bind(client.updated_at)
        .bind(client.archived)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, id: &str) -> DbResult<Client> {
        let row: Option<ClientRow> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, address, postal_code, phone, email,
                   email_consent, year_of_birth, internal_notes, membership_paid_until,
                   created_at, updated_at, archived
            FROM clients
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Client::from)
            .ok_or_else(|| CoreError::not_found("client", id).into())
    }

    /// Inline edit of one whitelisted column.
    pub async fn edit_column(&self, id: &str, column: &str, value: &str) -> DbResult<Client> {
        let edit = ClientEdit::parse(column, value)?;

        debug!(id = %id, column = edit.column(), "Editing client column");

        let sql = format!(
            "UPDATE clients SET {} = ?1, updated_at = ?2 WHERE id = ?3",
            edit.column()
        );
        let result = bind_value(sqlx::query(&sql), edit.value())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("client", id).into());
        }
        self.get(id).await
    }

    /// Deletes a client. Fails with a foreign key violation while a
    /// workorder still references it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("client", id).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::fixtures::test_db;

    #[tokio::test]
    async fn test_create_and_edit() {
        let db = test_db().await;
        let client = Client::new("Marie", "Tremblay", Utc::now());
        db.clients().create(&client).await.unwrap();

        let edited = db
            .clients()
            .edit_column(&client.id, "postal_code", "h2x 1y4")
            .await
            .unwrap();
        assert_eq!(edited.postal_code, "H2X 1Y4");

        let edited = db
            .clients()
            .edit_column(&client.id, "year_of_birth", "1984")
            .await
            .unwrap();
        assert_eq!(edited.year_of_birth, Some(1984));

        let edited = db
            .clients()
            .edit_column(&client.id, "email_consent", "yes")
            .await
            .unwrap();
        assert!(edited.email_consent);
        assert_eq!(edited.name(), "Marie Tremblay");
    }

    #[tokio::test]
    async fn test_edit_rejects_unknown_column() {
        let db = test_db().await;
        let client = Client::new("Luc", "Gagnon", Utc::now());
        db.clients().create(&client).await.unwrap();

        let err = db
            .clients()
            .edit_column(&client.id, "archived", "1")
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::InvalidColumnEdit { .. })));
    }

    #[tokio::test]
    async fn test_delete_restricted_by_workorder() {
        let db = test_db().await;
        let client = Client::new("Luc", "Gagnon", Utc::now());
        db.clients().create(&client).await.unwrap();
        db.workorders().create(Some(&client.id)).await.unwrap();

        let err = db.clients().delete(&client.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        let lonely = Client::new("Ana", "Roy", Utc::now());
        db.clients().create(&lonely).await.unwrap();
        db.clients().delete(&lonely.id).await.unwrap();
        assert!(db.clients().get(&lonely.id).await.is_err());
    }
}
