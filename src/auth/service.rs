//! Authentication service
//!
//! Core business logic for email/password authentication and session
//! management.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AuthTokensResponse, LoginRequest, RegisterRequest, User, UserResponse,
};

use super::jwt::{generate_access_token, generate_refresh_token, verify_token, JwtError};

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is suspended")]
    AccountSuspended,

    #[error("Session not found or revoked")]
    SessionNotFound,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Password hashing failed: {0}")]
    HashingError(String),

    #[error("Role cannot be self-assigned at registration")]
    RoleNotAllowed,
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::DatabaseError(e.to_string())
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        AuthError::TokenError(e.to_string())
    }
}

impl From<bcrypt::BcryptError> for AuthError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AuthError::HashingError(e.to_string())
    }
}

impl From<AuthError> for crate::error::ApiError {
    fn from(e: AuthError) -> Self {
        use crate::error::ApiError;
        match e {
            AuthError::EmailTaken => ApiError::Conflict(e.to_string()),
            AuthError::InvalidCredentials
            | AuthError::SessionNotFound
            | AuthError::InvalidRefreshToken
            | AuthError::TokenError(_) => ApiError::Unauthorized(e.to_string()),
            AuthError::AccountSuspended | AuthError::RoleNotAllowed => {
                ApiError::Forbidden(e.to_string())
            }
            AuthError::DatabaseError(msg) => ApiError::DatabaseError(msg),
            AuthError::HashingError(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db_pool: PgPool,
    jwt_secret: String,
    access_token_ttl_seconds: i64,
    refresh_token_ttl_days: i64,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        db_pool: PgPool,
        jwt_secret: String,
        access_token_ttl_seconds: i64,
        refresh_token_ttl_days: i64,
    ) -> Self {
        Self {
            db_pool,
            jwt_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_days,
        }
    }

    /// JWT signing secret, used by the auth extractor
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Register a new account and issue a token pair
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthTokensResponse, AuthError> {
        // Admin accounts are provisioned out of band
        if matches!(request.role, crate::models::UserRole::Admin) {
            return Err(AuthError::RoleNotAllowed);
        }

        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(&request.email)
                .fetch_optional(&self.db_pool)
                .await?;

        if existing.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, name, role, suspended, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.email)
        .bind(&password_hash)
        .bind(&request.name)
        .bind(request.role)
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await?;

        // Every account gets a wallet so refund credits always have a target
        sqlx::query("INSERT INTO wallets (user_id, balance, updated_at) VALUES ($1, 0, $2)")
            .bind(user.id)
            .bind(Utc::now())
            .execute(&self.db_pool)
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role.as_str(), "New account registered");

        self.issue_tokens(user).await
    }

    /// Authenticate with email and password
    pub async fn login(&self, request: LoginRequest) -> Result<AuthTokensResponse, AuthError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(&request.email)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !bcrypt::verify(&request.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        // Temporary bans lift lazily: a suspended account whose ban window
        // has passed is unbanned on its next login attempt
        if user.suspended && !self.lift_expired_ban(user.id).await? {
            return Err(AuthError::AccountSuspended);
        }

        self.issue_tokens(user).await
    }

    /// Lift an active temporary ban whose window has passed. Returns true
    /// when the account was unbanned.
    async fn lift_expired_ban(&self, user_id: Uuid) -> Result<bool, AuthError> {
        let mut tx = self.db_pool.begin().await?;
        let now = Utc::now();

        let lifted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE blacklist_entries
            SET lifted_at = $1
            WHERE user_id = $2 AND lifted_at IS NULL
              AND ban_type = 'temporary' AND ban_until <= $1
            RETURNING id
            "#,
        )
        .bind(now)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if lifted.is_none() {
            return Ok(false);
        }

        sqlx::query("UPDATE users SET suspended = FALSE, updated_at = $1 WHERE id = $2")
            .bind(now)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, "Expired temporary ban lifted at login");

        Ok(true)
    }

    /// Exchange a refresh token for a new token pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthTokensResponse, AuthError> {
        let claims = verify_token(refresh_token, &self.jwt_secret)?;

        if claims.token_type != "refresh" {
            return Err(AuthError::InvalidRefreshToken);
        }

        // The old session must still be live
        self.verify_session(&claims.jti).await?;

        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidRefreshToken)?;

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if user.suspended {
            return Err(AuthError::AccountSuspended);
        }

        // Rotate: revoke the old session before issuing a new one
        self.revoke_session(&claims.jti).await?;

        self.issue_tokens(user).await
    }

    /// Revoke the session behind a token (logout)
    pub async fn logout(&self, jti: &str) -> Result<(), AuthError> {
        self.revoke_session(jti).await
    }

    /// Check that a session exists and has not been revoked or expired
    pub async fn verify_session(&self, jti: &str) -> Result<(), AuthError> {
        let row: Option<(Option<chrono::DateTime<Utc>>, chrono::DateTime<Utc>)> = sqlx::query_as(
            "SELECT revoked_at, expires_at FROM auth_sessions WHERE jti = $1",
        )
        .bind(jti)
        .fetch_optional(&self.db_pool)
        .await?;

        match row {
            Some((None, expires_at)) if expires_at > Utc::now() => Ok(()),
            _ => Err(AuthError::SessionNotFound),
        }
    }

    async fn revoke_session(&self, jti: &str) -> Result<(), AuthError> {
        sqlx::query(
            "UPDATE auth_sessions SET revoked_at = $1 WHERE jti = $2 AND revoked_at IS NULL",
        )
        .bind(Utc::now())
        .bind(jti)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    async fn issue_tokens(&self, user: User) -> Result<AuthTokensResponse, AuthError> {
        let jti = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::days(self.refresh_token_ttl_days);

        sqlx::query(
            r#"
            INSERT INTO auth_sessions (jti, user_id, expires_at, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&jti)
        .bind(user.id)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(&self.db_pool)
        .await?;

        let access_token = generate_access_token(
            &user,
            &jti,
            &self.jwt_secret,
            self.access_token_ttl_seconds,
        )?;
        let refresh_token = generate_refresh_token(
            &user,
            &jti,
            &self.jwt_secret,
            self.refresh_token_ttl_days,
        )?;

        Ok(AuthTokensResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_ttl_seconds,
            user: UserResponse::from(user),
        })
    }
}
