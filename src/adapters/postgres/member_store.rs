use crate::domain::{Member, MemberId};
use crate::ports::member_store::{MemberStore as MemberStoreTrait, Result};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use sqlx::{PgPool, Row, postgres::PgRow};

fn map_row_to_member(row: &PgRow) -> Member {
    Member {
        member_id: MemberId::new(row.get("member_id")),
        name: row.get("name"),
        department: row.get("department"),
    }
}

/// PostgreSQL implementation of MemberStore
pub struct MemberStore {
    pool: PgPool,
}

impl MemberStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberStoreTrait for MemberStore {
    async fn insert(&self, member: Member) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO members (member_id, name, department)
            VALUES ($1, $2, $3)
            ON CONFLICT (member_id) DO NOTHING
            "#,
        )
        .bind(member.member_id.value())
        .bind(&member.name)
        .bind(&member.department)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find(&self, member_id: MemberId) -> Result<Option<Member>> {
        let row = sqlx::query(
            r#"
            SELECT member_id, name, department
            FROM members
            WHERE member_id = $1
            "#,
        )
        .bind(member_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_member))
    }

    fn stream_all(&self) -> BoxStream<'_, Result<Member>> {
        sqlx::query(
            r#"
            SELECT member_id, name, department
            FROM members
            ORDER BY member_id ASC
            "#,
        )
        .fetch(&self.pool)
        .map(|row_result| -> Result<Member> { Ok(map_row_to_member(&row_result?)) })
        .boxed()
    }
}
