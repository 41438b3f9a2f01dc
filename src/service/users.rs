use std::sync::Arc;

use crate::db::{Gateway, GatewayError};
use crate::error::AppError;
use crate::models::{CreateUser, NewUser, UpdateUser, User, UserDto, UserFilter, UserLookup};
use crate::password;

/// Account lifecycle over an injected [`Gateway`]. Holds no state of its own.
#[derive(Clone)]
pub struct UserService {
    gateway: Arc<dyn Gateway>,
}

impl UserService {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Hash the password and insert the user as inactive.
    ///
    /// A duplicate username is detected only by the store's unique
    /// constraint, so concurrent creates for the same name resolve to one
    /// success and one `Conflict`.
    pub async fn create(&self, req: &CreateUser) -> Result<User, AppError> {
        let password = password::hash(&req.password).map_err(|e| {
            tracing::error!("Error generating password hash: {e}");
            AppError::Validation(format!("Error generating password: {e}"))
        })?;

        let user = self
            .gateway
            .insert_user(&NewUser {
                username: req.username.clone(),
                password,
                role: req.role.clone(),
            })
            .await
            .map_err(|e| match e {
                GatewayError::UniqueViolation(_) => {
                    AppError::Conflict("Username already exists".to_string())
                }
                other => internal("Error creating user", other),
            })?;

        tracing::info!("Created user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Overwrite username, active flag and role of an existing user.
    pub async fn update(&self, req: &UpdateUser) -> Result<User, AppError> {
        self.gateway
            .find_user(UserLookup::Id(req.id))
            .await
            .map_err(|e| not_found_or_internal(e, req.id, "Error finding user by ID"))?;

        let user = self
            .gateway
            .update_user(req.id, &req.fields())
            .await
            .map_err(|e| match e {
                GatewayError::UniqueViolation(_) => {
                    AppError::Conflict("Username already exists".to_string())
                }
                other => not_found_or_internal(other, req.id, "Error updating user"),
            })?;

        tracing::debug!(
            "Updated user {} (username={}, is_active={}, role={})",
            user.id,
            user.username,
            user.is_active,
            user.role
        );
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<UserDto, AppError> {
        self.gateway
            .find_user_dto(UserLookup::Id(id))
            .await
            .map_err(|e| not_found_or_internal(e, id, "Error finding user by ID"))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<UserDto, AppError> {
        self.gateway
            .find_user_dto(UserLookup::Username(username))
            .await
            .map_err(|e| match e {
                GatewayError::NotFound => {
                    AppError::NotFound(format!("User '{username}' not found"))
                }
                other => internal("Error finding user by username", other),
            })
    }

    /// Users matching every supplied filter. No match is an empty list.
    pub async fn find(&self, params: &UserFilter) -> Result<Vec<UserDto>, AppError> {
        Ok(self.gateway.find_users(params).await?)
    }
}

fn internal(context: &str, err: GatewayError) -> AppError {
    tracing::error!("{context}: {err}");
    AppError::Internal(format!("{context}: {err}"))
}

fn not_found_or_internal(err: GatewayError, id: i64, context: &str) -> AppError {
    match err {
        GatewayError::NotFound => AppError::NotFound(format!("User {id} not found")),
        other => internal(context, other),
    }
}
