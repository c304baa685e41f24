//! Database operations for users.

use chrono::Utc;
use sea_orm::*;

use crate::entity::user::{self, ActiveModel, Entity as UserEntity};
use crate::error::{AppError, AppResult};
use crate::models::user::User;

/// Fields needed to create a user. The password must already be hashed.
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub hashed_password: &'a str,
    pub is_admin: bool,
}

/// Insert a new active user.
pub async fn insert(db: &DatabaseConnection, new_user: NewUser<'_>) -> AppResult<User> {
    let model = ActiveModel {
        username: Set(new_user.username.to_string()),
        email: Set(new_user.email.to_string()),
        hashed_password: Set(new_user.hashed_password.to_string()),
        is_admin: Set(new_user.is_admin),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        last_login: Set(None),
        ..Default::default()
    };

    let inserted = model.insert(db).await?;
    Ok(inserted.into())
}

/// Find a user by username.
pub async fn find_by_username(db: &DatabaseConnection, username: &str) -> AppResult<Option<User>> {
    let result = UserEntity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;

    Ok(result.map(User::from))
}

/// Find a user by email.
pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> AppResult<Option<User>> {
    let result = UserEntity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;

    Ok(result.map(User::from))
}

/// Find a user by ID.
pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> AppResult<Option<User>> {
    let result = UserEntity::find_by_id(id).one(db).await?;
    Ok(result.map(User::from))
}

/// Stamp `last_login` with the current time.
pub async fn touch_last_login(db: &DatabaseConnection, id: i32) -> AppResult<User> {
    let existing = UserEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    let mut active: ActiveModel = existing.into();
    active.last_login = Set(Some(Utc::now()));
    let updated = active.update(db).await?;

    Ok(updated.into())
}

/// List all users, newest first.
pub async fn list_all(db: &DatabaseConnection) -> AppResult<Vec<User>> {
    let users = UserEntity::find()
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .all(db)
        .await?;

    Ok(users.into_iter().map(User::from).collect())
}

/// Delete a user. Returns false when no row matched.
pub async fn delete(db: &DatabaseConnection, id: i32) -> AppResult<bool> {
    let result = UserEntity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}
