use crate::{
    auth::{self, AuthService, AuthUser, TokenResponse},
    db::DbPool,
    entities::user::{self, Entity as User, UserRole},
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct RegisterUser {
    #[validate(length(min = 3, message = "username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    /// Optional; self-registered accounts default to `unspecified` until an
    /// admin assigns a role.
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// User accounts and credential handling. Passwords are argon2-hashed and
/// never logged or returned.
pub struct UserService {
    db_pool: Arc<DbPool>,
    auth: AuthService,
    event_sender: Arc<EventSender>,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>, auth: AuthService, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            auth,
            event_sender,
        }
    }

    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterUser) -> Result<user::Model, ServiceError> {
        input.validate()?;
        let db = self.db_pool.as_ref();

        let existing = User::find()
            .filter(user::Column::Username.eq(input.username.clone()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Username {} is already taken",
                input.username
            )));
        }

        let password_hash = auth::hash_password(&input.password)?;
        let role = input.role.unwrap_or_default();

        let user = user::ActiveModel {
            username: Set(input.username),
            password_hash: Set(password_hash),
            role: Set(role.to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(user_id = user.id, "Registered user");

        self.event_sender
            .send(Event::UserRegistered(user.id))
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        Ok(user)
    }

    /// Verifies credentials and issues a bearer token. Wrong username and
    /// wrong password produce the same error.
    pub async fn login(&self, input: LoginRequest) -> Result<TokenResponse, ServiceError> {
        input.validate()?;
        let db = self.db_pool.as_ref();

        let user = User::find()
            .filter(user::Column::Username.eq(input.username.clone()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::Unauthorized("Invalid username or password".to_string())
            })?;

        if !auth::verify_password(&input.password, &user.password_hash)? {
            return Err(ServiceError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }

        let token = self.auth.issue_token(&user)?;

        self.event_sender
            .send(Event::UserLoggedIn(user.id))
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))?;

        Ok(token)
    }

    pub async fn get_user(&self, user_id: i32) -> Result<user::Model, ServiceError> {
        User::find_by_id(user_id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("User with ID {} not found", user_id)))
    }

    pub async fn list_users(&self) -> Result<Vec<user::Model>, ServiceError> {
        User::find()
            .order_by_asc(user::Column::Id)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Admin-only role assignment, the single mutation users support.
    pub async fn assign_role(
        &self,
        user_id: i32,
        role: UserRole,
        actor: &AuthUser,
    ) -> Result<user::Model, ServiceError> {
        if !actor.is_admin() {
            return Err(ServiceError::Forbidden(
                "Only admins may assign roles".to_string(),
            ));
        }

        let user = self.get_user(user_id).await?;

        let mut active: user::ActiveModel = user.into();
        active.role = Set(role.to_string());

        let updated = active
            .update(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        info!(
            user_id,
            role = %role,
            assigned_by = actor.user_id,
            "Assigned user role"
        );

        Ok(updated)
    }
}
