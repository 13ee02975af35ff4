//! Account service
//!
//! Account lifecycle: validated creation, field updates, credential
//! verification, and cascade deletion. Every write path runs through
//! this service, so the hash-before-persist step cannot be skipped
//! by a caller.

use std::sync::Arc;

use chrono::Utc;

use crate::auth;
use crate::data::{Account, Database, EntityId, format_created_at};
use crate::error::AppError;

/// Accepted profile image extensions (case-sensitive suffix match)
const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".webp", ".svg"];

/// Fields required to create an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile_image_url: Option<String>,
}

/// Field changes for an existing account
///
/// Absent fields are left untouched. `profile_image_url` uses the double
/// `Option`: `Some(None)` clears the image. A present `password` is
/// re-validated and re-hashed inside [`AccountService::update`].
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub email: Option<String>,
    pub profile_image_url: Option<Option<String>>,
    pub password: Option<String>,
}

fn is_valid_email(email: &str) -> bool {
    // local@domain.tld: non-empty local part, domain with a dot and
    // non-empty labels on both sides of the last dot
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

fn validate_email(email: &str) -> Result<(), AppError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "email must match local@domain.tld".to_string(),
        ))
    }
}

fn validate_profile_image_url(url: &str) -> Result<(), AppError> {
    if IMAGE_EXTENSIONS.iter().any(|ext| url.ends_with(ext)) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "profile_image_url must end in one of: {}",
            IMAGE_EXTENSIONS.join(" ")
        )))
    }
}

/// Account service
pub struct AccountService {
    db: Arc<Database>,
    bcrypt_cost: u32,
}

impl AccountService {
    /// Create new account service
    ///
    /// # Arguments
    /// * `bcrypt_cost` - cost factor for password hashing (config default: 10)
    pub fn new(db: Arc<Database>, bcrypt_cost: u32) -> Self {
        Self { db, bcrypt_cost }
    }

    /// Get an account by ID
    pub async fn get(&self, id: &str) -> Result<Account, AppError> {
        self.db.get_account(id).await?.ok_or(AppError::NotFound)
    }

    /// Create a new account
    ///
    /// Validates fields in a fixed order (username, email, password,
    /// profile image) and reports the first failure. The password is
    /// hashed before the row is written; uniqueness collisions on
    /// username/email come back as `Uniqueness`.
    pub async fn create(&self, new_account: NewAccount) -> Result<Account, AppError> {
        let username = new_account.username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("username is required".to_string()));
        }

        validate_email(&new_account.email)?;
        auth::validate_password(&new_account.password)?;
        if let Some(url) = new_account.profile_image_url.as_deref() {
            validate_profile_image_url(url)?;
        }

        let password_hash = auth::hash_password(&new_account.password, self.bcrypt_cost).await?;

        let now = Utc::now();
        let account = Account {
            id: EntityId::new().0,
            username: username.to_string(),
            email: new_account.email,
            password_hash,
            profile_image_url: new_account.profile_image_url,
            created_at: now,
            updated_at: now,
        };

        self.db.insert_account(&account).await?;

        tracing::info!(account_id = %account.id, username = %account.username, "Account created");

        Ok(account)
    }

    /// Apply field changes to an existing account
    ///
    /// This is the single mutation path. When `password` is present it is
    /// re-validated and re-hashed here; otherwise the stored hash is left
    /// byte-for-byte untouched.
    pub async fn update(&self, id: &str, changes: AccountChanges) -> Result<Account, AppError> {
        if let Some(email) = changes.email.as_deref() {
            validate_email(email)?;
        }
        if let Some(Some(url)) = changes.profile_image_url.as_ref().map(|v| v.as_deref()) {
            validate_profile_image_url(url)?;
        }

        let password_hash = match changes.password.as_deref() {
            Some(password) => {
                auth::validate_password(password)?;
                Some(auth::hash_password(password, self.bcrypt_cost).await?)
            }
            None => None,
        };

        let updated = self
            .db
            .patch_account(
                id,
                changes.email.as_deref(),
                changes
                    .profile_image_url
                    .as_ref()
                    .map(|value| value.as_deref()),
                password_hash.as_deref(),
                Utc::now(),
            )
            .await?;
        if !updated {
            return Err(AppError::NotFound);
        }

        self.get(id).await
    }

    /// Change an account's password
    ///
    /// Convenience wrapper over [`AccountService::update`]; triggers
    /// the rehash like any password-carrying change.
    pub async fn change_password(&self, id: &str, password: &str) -> Result<Account, AppError> {
        self.update(
            id,
            AccountChanges {
                password: Some(password.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    /// Check a candidate plaintext against an account's stored hash
    ///
    /// # Returns
    /// `Ok(false)` on mismatch; errors only on internal hashing failure
    pub async fn verify_password(
        &self,
        account: &Account,
        candidate: &str,
    ) -> Result<bool, AppError> {
        auth::verify_password(candidate, &account.password_hash).await
    }

    /// Verify credentials for login
    ///
    /// # Errors
    /// `Unauthorized` when the email is unknown or the password does not
    /// match; the two cases are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AppError> {
        let Some(account) = self.db.get_account_by_email(email).await? else {
            return Err(AppError::Unauthorized);
        };

        if self.verify_password(&account, password).await? {
            Ok(account)
        } else {
            Err(AppError::Unauthorized)
        }
    }

    /// Delete an account and all posts it owns
    ///
    /// The post cascade and the account delete run in one transaction; a
    /// cascade failure surfaces as `Cascade` and leaves everything in
    /// place, distinct from `NotFound` for a missing account.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let posts_deleted = self.db.delete_account_cascade(id).await?;

        tracing::info!(account_id = %id, posts_deleted, "Account deleted");

        Ok(())
    }

    /// Add a friend edge (weak relation, idempotent)
    pub async fn add_friend(&self, id: &str, friend_id: &str) -> Result<(), AppError> {
        if id == friend_id {
            return Err(AppError::Validation(
                "an account cannot befriend itself".to_string(),
            ));
        }

        // Both endpoints must exist; the edge itself carries no ownership.
        self.get(id).await?;
        self.get(friend_id).await?;

        self.db.insert_friend(id, friend_id).await
    }

    /// Remove a friend edge
    pub async fn remove_friend(&self, id: &str, friend_id: &str) -> Result<(), AppError> {
        if !self.db.delete_friend(id, friend_id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// List the accounts an account has befriended
    pub async fn friends(&self, id: &str) -> Result<Vec<Account>, AppError> {
        self.get(id).await?;
        self.db.get_friends(id).await
    }

    /// Render an account's creation time in the display format
    ///
    /// Pure read-time projection; see [`format_created_at`].
    pub fn format_created_at(&self, account: &Account) -> String {
        format_created_at(account.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Post;
    use tempfile::TempDir;

    // bcrypt's minimum cost keeps the tests fast
    const TEST_COST: u32 = 4;

    async fn create_test_service() -> (AccountService, Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("service-account.db");
        let db = Arc::new(Database::connect(&db_path).await.unwrap());
        (AccountService::new(db.clone(), TEST_COST), db, temp_dir)
    }

    fn new_account(username: &str, email: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            password: "Password123!".to_string(),
            profile_image_url: None,
        }
    }

    #[tokio::test]
    async fn create_hashes_and_verifies() {
        let (service, _db, _temp_dir) = create_test_service().await;

        let account = service
            .create(new_account("testuser", "testuser@example.com"))
            .await
            .unwrap();

        assert_ne!(account.password_hash, "Password123!");
        assert!(account.password_hash.starts_with("$2"));
        assert!(
            service
                .verify_password(&account, "Password123!")
                .await
                .unwrap()
        );
        assert!(
            !service
                .verify_password(&account, "passWord?123")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn create_trims_username() {
        let (service, _db, _temp_dir) = create_test_service().await;

        let account = service
            .create(new_account("  spacey  ", "spacey@example.com"))
            .await
            .unwrap();
        assert_eq!(account.username, "spacey");
    }

    #[tokio::test]
    async fn create_reports_first_failing_field() {
        let (service, _db, _temp_dir) = create_test_service().await;

        let empty_username = service
            .create(new_account("   ", "ok@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(empty_username, AppError::Validation(msg) if msg.contains("username")));

        let bad_email = service
            .create(new_account("user", "not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(bad_email, AppError::Validation(msg) if msg.contains("email")));

        let mut weak_password = new_account("user", "user@example.com");
        weak_password.password = "password123".to_string();
        let error = service.create(weak_password).await.unwrap_err();
        assert!(matches!(error, AppError::Validation(msg) if msg.contains("password")));

        let mut bad_image = new_account("user", "user@example.com");
        bad_image.profile_image_url = Some("https://cdn.example.com/me.gif".to_string());
        let error = service.create(bad_image).await.unwrap_err();
        assert!(matches!(error, AppError::Validation(msg) if msg.contains("profile_image_url")));
    }

    #[tokio::test]
    async fn create_accepts_image_extensions_case_sensitively() {
        let (service, _db, _temp_dir) = create_test_service().await;

        let mut ok = new_account("imageok", "imageok@example.com");
        ok.profile_image_url = Some("https://cdn.example.com/me.webp".to_string());
        assert!(service.create(ok).await.is_ok());

        let mut uppercase = new_account("imagebad", "imagebad@example.com");
        uppercase.profile_image_url = Some("https://cdn.example.com/me.PNG".to_string());
        let error = service.create(uppercase).await.unwrap_err();
        assert!(matches!(error, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_username_fails_despite_different_email() {
        let (service, _db, _temp_dir) = create_test_service().await;

        service
            .create(new_account("taken", "first@example.com"))
            .await
            .unwrap();

        let error = service
            .create(new_account("taken", "second@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Uniqueness(field) if field == "username"));
    }

    #[tokio::test]
    async fn email_only_update_keeps_password_hash() {
        let (service, _db, _temp_dir) = create_test_service().await;

        let account = service
            .create(new_account("emailuser", "old@example.com"))
            .await
            .unwrap();

        let updated = service
            .update(
                &account.id,
                AccountChanges {
                    email: Some("new@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.password_hash, account.password_hash);
        assert!(
            service
                .verify_password(&updated, "Password123!")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn change_password_rehashes() {
        let (service, _db, _temp_dir) = create_test_service().await;

        let account = service
            .create(new_account("rotate", "rotate@example.com"))
            .await
            .unwrap();

        let updated = service
            .change_password(&account.id, "NewSecret9?")
            .await
            .unwrap();

        assert_ne!(updated.password_hash, account.password_hash);
        assert!(
            service
                .verify_password(&updated, "NewSecret9?")
                .await
                .unwrap()
        );
        assert!(
            !service
                .verify_password(&updated, "Password123!")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn update_missing_account_is_not_found() {
        let (service, _db, _temp_dir) = create_test_service().await;

        let error = service
            .update(
                "no-such-id",
                AccountChanges {
                    email: Some("ghost@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::NotFound));
    }

    #[tokio::test]
    async fn authenticate_checks_credentials() {
        let (service, _db, _temp_dir) = create_test_service().await;

        service
            .create(new_account("login", "login@example.com"))
            .await
            .unwrap();

        let account = service
            .authenticate("login@example.com", "Password123!")
            .await
            .unwrap();
        assert_eq!(account.username, "login");

        let wrong_password = service
            .authenticate("login@example.com", "Wrong123!")
            .await
            .unwrap_err();
        assert!(matches!(wrong_password, AppError::Unauthorized));

        let unknown_email = service
            .authenticate("ghost@example.com", "Password123!")
            .await
            .unwrap_err();
        assert!(matches!(unknown_email, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn delete_cascades_posts() {
        let (service, db, _temp_dir) = create_test_service().await;

        let account = service
            .create(new_account("owner", "owner@example.com"))
            .await
            .unwrap();

        for i in 0..3 {
            db.insert_post(&Post {
                id: EntityId::new().0,
                title: format!("Project {}", i),
                body: "body".to_string(),
                tags: "[]".to_string(),
                repo_link: None,
                deployed_link: None,
                created_by: account.id.clone(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        }

        service.delete(&account.id).await.unwrap();

        assert!(db.get_account(&account.id).await.unwrap().is_none());
        assert!(
            db.get_posts_by_account(&account.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn delete_missing_account_is_not_found() {
        let (service, _db, _temp_dir) = create_test_service().await;

        let error = service.delete("no-such-id").await.unwrap_err();
        assert!(matches!(error, AppError::NotFound));
    }

    #[tokio::test]
    async fn friend_edges() {
        let (service, _db, _temp_dir) = create_test_service().await;

        let alex = service
            .create(new_account("alex", "alex@example.com"))
            .await
            .unwrap();
        let brett = service
            .create(new_account("brett", "brett@example.com"))
            .await
            .unwrap();

        let self_friend = service.add_friend(&alex.id, &alex.id).await.unwrap_err();
        assert!(matches!(self_friend, AppError::Validation(_)));

        service.add_friend(&alex.id, &brett.id).await.unwrap();
        service.add_friend(&alex.id, &brett.id).await.unwrap();

        let friends = service.friends(&alex.id).await.unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].username, "brett");

        service.remove_friend(&alex.id, &brett.id).await.unwrap();
        let missing_edge = service
            .remove_friend(&alex.id, &brett.id)
            .await
            .unwrap_err();
        assert!(matches!(missing_edge, AppError::NotFound));
    }

    #[tokio::test]
    async fn format_created_at_is_deterministic() {
        let (service, _db, _temp_dir) = create_test_service().await;

        let account = service
            .create(new_account("clock", "clock@example.com"))
            .await
            .unwrap();

        let first = service.format_created_at(&account);
        let second = service.format_created_at(&account);
        assert_eq!(first, second);
        assert!(first.contains(" at "));
    }
}
