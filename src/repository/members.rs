//! Members repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::member::{CreateMember, Member, Role, UpdateMember},
};

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Check whether an email is already taken, optionally excluding one member.
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM members WHERE email = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a new member, returning its id.
    pub async fn create(&self, member: &CreateMember) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO members (name, email, membership_type, role, password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&member.name)
        .bind(&member.email)
        .bind(member.membership_type)
        .bind(member.role)
        .bind(&member.password)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Apply a partial update. Only supplied fields are written.
    pub async fn update(&self, id: i32, update: &UpdateMember) -> AppResult<()> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE members SET ");
        {
            let mut fields = qb.separated(", ");
            if let Some(ref name) = update.name {
                fields.push("name = ").push_bind_unseparated(name);
            }
            if let Some(ref email) = update.email {
                fields.push("email = ").push_bind_unseparated(email);
            }
            if let Some(membership_type) = update.membership_type {
                fields
                    .push("membership_type = ")
                    .push_bind_unseparated(membership_type);
            }
            if let Some(role) = update.role {
                fields.push("role = ").push_bind_unseparated(role);
            }
            if let Some(ref password) = update.password {
                fields.push("password = ").push_bind_unseparated(password);
            }
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id);

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member with id {} not found", id)));
        }
        Ok(())
    }

    /// Delete a member by id. Callers guard against open loans first.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member with id {} not found", id)));
        }
        Ok(())
    }

    /// All members, ordered by id.
    pub async fn list(&self) -> AppResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>("SELECT * FROM members ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(members)
    }

    /// Substring search over name and email. The search text is matched
    /// literally; case sensitivity follows the store collation.
    pub async fn search(&self, text: &str) -> AppResult<Vec<Member>> {
        let pattern = format!("%{}%", super::escape_like(text));
        let members = sqlx::query_as::<_, Member>(
            "SELECT * FROM members \
             WHERE name LIKE $1 ESCAPE '\\' OR email LIKE $1 ESCAPE '\\' \
             ORDER BY id",
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    /// Look up a member by credentials and role.
    ///
    /// Passwords are opaque plaintext values in this schema; the comparison
    /// happens in the store through bound parameters.
    pub async fn find_by_credentials(
        &self,
        name: &str,
        password: &str,
        role: Role,
    ) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(
            "SELECT * FROM members WHERE name = $1 AND password = $2 AND role = $3",
        )
        .bind(name)
        .bind(password)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }
}
