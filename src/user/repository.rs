use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use crate::progression::{Achievement, Level};
use crate::shared::AppError;

/// Trait for user repository operations
///
/// `list_users` returns users in registration order (join date), which is
/// the tie-break order the leaderboard relies on.
#[async_trait]
pub trait UserRepository {
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError>;
    async fn update_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn list_users(&self) -> Result<Vec<UserModel>, AppError>;
    async fn count_users(&self) -> Result<i64, AppError>;
    async fn find_by_referral_code(&self, code: &str) -> Result<Option<UserModel>, AppError>;
}

/// In-memory implementation of UserRepository for development and testing
///
/// Data is stored in memory and lost when the application restarts.
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated users
    pub fn with_users(users: Vec<UserModel>) -> Self {
        let mut user_map = HashMap::new();
        for user in users {
            user_map.insert(user.id.clone(), user);
        }

        Self {
            users: Mutex::new(user_map),
        }
    }

    /// Returns the current number of users in the repository
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, name = %user.name, "Creating user in memory");

        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.id) {
            warn!(user_id = %user.id, "User already exists in memory");
            return Err(AppError::DatabaseError("User already exists".to_string()));
        }
        users.insert(user.id.clone(), user.clone());

        debug!(user_id = %user.id, "User created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        debug!(user_id = %user_id, "Fetching user from memory");

        let users = self.users.lock().unwrap();
        let user = users.get(user_id).cloned();

        match &user {
            Some(u) => debug!(user_id = %user_id, name = %u.name, "User found in memory"),
            None => debug!(user_id = %user_id, "User not found in memory"),
        }

        Ok(user)
    }

    #[instrument(skip(self, user))]
    async fn update_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, "Updating user in memory");

        let mut users = self.users.lock().unwrap();
        if !users.contains_key(&user.id) {
            warn!(user_id = %user.id, "User not found for update in memory");
            return Err(AppError::NotFound("User not found".to_string()));
        }
        users.insert(user.id.clone(), user.clone());

        debug!(user_id = %user.id, "User updated successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserModel>, AppError> {
        debug!("Listing all users in memory");

        let users = self.users.lock().unwrap();
        let mut user_list: Vec<UserModel> = users.values().cloned().collect();
        // HashMap iteration order is arbitrary; registration order is the contract
        user_list.sort_by(|a, b| (a.join_date, &a.id).cmp(&(b.join_date, &b.id)));

        Ok(user_list)
    }

    #[instrument(skip(self))]
    async fn count_users(&self) -> Result<i64, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.len() as i64)
    }

    #[instrument(skip(self))]
    async fn find_by_referral_code(&self, code: &str) -> Result<Option<UserModel>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.referral_code == code).cloned())
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<UserModel, AppError> {
        let level: String = row.get("level");
        let level = level
            .parse::<Level>()
            .map_err(|e| AppError::DatabaseError(format!("Invalid level value: {}", e)))?;
        let achievements: Json<Vec<Achievement>> = row.get("achievements");

        Ok(UserModel {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            referral_code: row.get("referral_code"),
            total_raised: row.get("total_raised"),
            donations_count: row.get("donations_count"),
            current_goal: row.get("current_goal"),
            level,
            streak: row.get("streak"),
            last_donation_date: row.get("last_donation_date"),
            achievements: achievements.0,
            join_date: row.get("join_date"),
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, name = %user.name, "Creating user in database");

        sqlx::query(
            "INSERT INTO users (id, name, email, referral_code, total_raised, donations_count, current_goal, level, streak, last_donation_date, achievements, join_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.referral_code)
        .bind(user.total_raised)
        .bind(user.donations_count)
        .bind(user.current_goal)
        .bind(user.level.to_string())
        .bind(user.streak)
        .bind(user.last_donation_date)
        .bind(Json(&user.achievements))
        .bind(user.join_date)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create user in database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(user_id = %user.id, "User created successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        debug!(user_id = %user_id, "Fetching user from database");

        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id = %user_id, "Failed to fetch user from database");
                AppError::DatabaseError(e.to_string())
            })?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    #[instrument(skip(self, user))]
    async fn update_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, "Updating user in database");

        let result = sqlx::query(
            "UPDATE users SET name = $2, email = $3, total_raised = $4, donations_count = $5, \
             current_goal = $6, level = $7, streak = $8, last_donation_date = $9, achievements = $10 \
             WHERE id = $1",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.total_raised)
        .bind(user.donations_count)
        .bind(user.current_goal)
        .bind(user.level.to_string())
        .bind(user.streak)
        .bind(user.last_donation_date)
        .bind(Json(&user.achievements))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user.id, "Failed to update user in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(user_id = %user.id, "User not found for update");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        debug!(user_id = %user.id, "User updated successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserModel>, AppError> {
        debug!("Listing all users from database");

        let rows = sqlx::query("SELECT * FROM users ORDER BY join_date, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to list users from database");
                AppError::DatabaseError(e.to_string())
            })?;

        rows.iter().map(Self::row_to_user).collect()
    }

    #[instrument(skip(self))]
    async fn count_users(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS user_count FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to count users in database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(row.get("user_count"))
    }

    #[instrument(skip(self))]
    async fn find_by_referral_code(&self, code: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query("SELECT * FROM users WHERE referral_code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to look up referral code in database");
                AppError::DatabaseError(e.to_string())
            })?;

        row.as_ref().map(Self::row_to_user).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test helper functions for creating test data
    mod helpers {
        use super::*;

        pub fn create_test_user(name: &str, referral_code: &str) -> UserModel {
            UserModel::new(name.to_string(), None, referral_code.to_string())
        }
    }

    use helpers::*;

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("Jane Doe", "JANE01");

        repo.create_user(&user).await.unwrap();

        let retrieved = repo.get_user(&user.id).await.unwrap();
        assert!(retrieved.is_some());
        let retrieved_user = retrieved.unwrap();
        assert_eq!(retrieved_user.id, user.id);
        assert_eq!(retrieved_user.name, "Jane Doe");
        assert_eq!(retrieved_user.referral_code, "JANE01");
    }

    #[tokio::test]
    async fn test_get_nonexistent_user() {
        let repo = InMemoryUserRepository::new();

        let result = repo.get_user("nonexistent-user").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_user() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("Jane Doe", "JANE01");

        repo.create_user(&user).await.unwrap();

        let result = repo.create_user(&user).await;
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), AppError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn test_update_missing_user_fails() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("Ghost", "GHOST1");

        let result = repo.update_user(&user).await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_user_persists_changes() {
        let repo = InMemoryUserRepository::new();
        let mut user = create_test_user("Jane Doe", "JANE01");
        repo.create_user(&user).await.unwrap();

        user.total_raised = 750;
        user.donations_count = 2;
        repo.update_user(&user).await.unwrap();

        let retrieved = repo.get_user(&user.id).await.unwrap().unwrap();
        assert_eq!(retrieved.total_raised, 750);
        assert_eq!(retrieved.donations_count, 2);
    }

    #[tokio::test]
    async fn test_list_users_in_registration_order() {
        let repo = InMemoryUserRepository::new();
        let first = create_test_user("First", "AAAAAA");
        let second = create_test_user("Second", "BBBBBB");
        let third = create_test_user("Third", "CCCCCC");

        repo.create_user(&first).await.unwrap();
        repo.create_user(&second).await.unwrap();
        repo.create_user(&third).await.unwrap();

        let users = repo.list_users().await.unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_count_users() {
        let repo = InMemoryUserRepository::new();
        assert_eq!(repo.count_users().await.unwrap(), 0);

        repo.create_user(&create_test_user("Jane", "JANE01"))
            .await
            .unwrap();
        repo.create_user(&create_test_user("John", "JOHN01"))
            .await
            .unwrap();

        assert_eq!(repo.count_users().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_find_by_referral_code() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("Jane", "JANE01");
        repo.create_user(&user).await.unwrap();

        let found = repo.find_by_referral_code("JANE01").await.unwrap();
        assert_eq!(found.unwrap().id, user.id);

        let missing = repo.find_by_referral_code("NOPE99").await.unwrap();
        assert!(missing.is_none());
    }
}
