//! Contacts store backed by a direct PostgreSQL connection.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{ContactStore, ContactWindow, StoreError};
use crate::models::contact::{ContactMemberRow, RawContactMemberRow, RawMember};

/// `sqlx` implementation of [`ContactStore`].
#[derive(Debug, Clone)]
pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Intermediate row for the contact/member left join.
#[derive(Debug, sqlx::FromRow)]
struct JoinRow {
    zip_code: Option<String>,
    has_member: bool,
    state: Option<String>,
    district: Option<String>,
    chamber: Option<String>,
}

impl From<JoinRow> for RawContactMemberRow {
    fn from(row: JoinRow) -> Self {
        Self {
            zip_code: row.zip_code,
            member: row.has_member.then(|| RawMember {
                state: row.state,
                district: row.district,
                chamber: row.chamber,
            }),
        }
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn count_contacts(&self, window: ContactWindow) -> Result<Option<i64>, StoreError> {
        // NULL bounds leave that side of the window open.
        let count = sqlx::query_scalar::<_, Option<i64>>(
            r#"
            SELECT COUNT(*)
            FROM contacts
            WHERE ($1::timestamptz IS NULL OR contacted_at >= $1)
              AND ($2::timestamptz IS NULL OR contacted_at <  $2)
            "#,
        )
        .bind(window.since)
        .bind(window.until)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn list_contact_members(&self) -> Result<Vec<ContactMemberRow>, StoreError> {
        let rows = sqlx::query_as::<_, JoinRow>(
            r#"
            SELECT
                c.zip_code,
                m.id IS NOT NULL AS has_member,
                m.state,
                m.district::text AS district,
                m.chamber::text AS chamber
            FROM contacts c
            LEFT JOIN congress_members m ON m.id = c.member_id
            ORDER BY c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let rows = rows
            .into_iter()
            .map(|row| ContactMemberRow::try_from(RawContactMemberRow::from(row)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
