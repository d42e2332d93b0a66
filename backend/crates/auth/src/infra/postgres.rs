//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::conversions::is_unique_violation;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    activation_code::ActivationCode, email::Email, person_name::PersonName, role::Role,
    user_id::UserId, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

const SELECT_USER: &str = r#"
    SELECT
        u.user_id,
        u.email,
        u.password_hash,
        u.first_name,
        u.last_name,
        u.activation_code,
        u.created_at,
        u.updated_at,
        COALESCE(
            array_agg(ur.role_code ORDER BY ur.position)
                FILTER (WHERE ur.role_code IS NOT NULL),
            '{}'
        ) AS roles
    FROM users u
    LEFT JOIN user_roles ur ON ur.user_id = u.user_id
"#;

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, filter: &str, bind: BindValue<'_>) -> AuthResult<Option<User>> {
        let sql = format!("{} WHERE {} GROUP BY u.user_id", SELECT_USER, filter);
        let query = sqlx::query_as::<_, UserRow>(&sql);
        let query = match bind {
            BindValue::Uuid(id) => query.bind(id),
            BindValue::Text(text) => query.bind(text),
        };

        let row = query.fetch_optional(&self.pool).await?;
        row.map(UserRow::into_user).transpose()
    }
}

enum BindValue<'a> {
    Uuid(Uuid),
    Text(&'a str),
}

async fn replace_roles(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &UserId,
    roles: &[Role],
) -> AuthResult<()> {
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(user_id.as_uuid())
        .execute(&mut **tx)
        .await?;

    let codes: Vec<&str> = roles.iter().map(Role::code).collect();
    sqlx::query(
        r#"
        INSERT INTO user_roles (user_id, role_code, position)
        SELECT $1, code, (ord - 1)::smallint
        FROM unnest($2::text[]) WITH ORDINALITY AS t(code, ord)
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(&codes[..])
    .execute(&mut **tx)
    .await?;

    Ok(())
}

impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                email,
                password_hash,
                first_name,
                last_name,
                activation_code,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(user.activation_code.as_ref().map(ActivationCode::expose))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::EmailTaken
            } else {
                AuthError::Database(e)
            }
        })?;

        replace_roles(&mut tx, &user.user_id, &user.roles).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE users SET
                first_name = $2,
                last_name = $3,
                password_hash = $4,
                activation_code = $5,
                updated_at = $6
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.activation_code.as_ref().map(ActivationCode::expose))
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::UserNotFound);
        }

        replace_roles(&mut tx, &user.user_id, &user.roles).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        self.find_one("u.user_id = $1", BindValue::Uuid(*user_id.as_uuid()))
            .await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        self.find_one("u.email = $1", BindValue::Text(email.as_str()))
            .await
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    activation_code: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    roles: Vec<String>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let password_hash = UserPassword::from_db(self.password_hash).map_err(|e| {
            AuthError::Internal(format!("Stored password hash for {}: {}", self.user_id, e))
        })?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            email: Email::from_db(self.email),
            password_hash,
            first_name: PersonName::from_db(self.first_name),
            last_name: PersonName::from_db(self.last_name),
            activation_code: self.activation_code.map(ActivationCode::from_db),
            roles: self.roles.into_iter().map(Role::from_db).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
