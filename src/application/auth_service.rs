use crate::domain::error::{DomainError, FieldErrors};
use crate::domain::repository::UserRepository;
use crate::domain::user::{
    CreateUser, LoginRequest, MIN_PASSWORD_LENGTH, UpdateUser, User, UserFlags, normalize_email,
};
use crate::infrastructure::security::{generate_token, hash_password, verify_password};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService<R: UserRepository> {
    user_repository: Arc<R>,
    jwt_secret: String,
    token_ttl_seconds: i64,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(user_repository: Arc<R>, jwt_secret: String, token_ttl_seconds: i64) -> Self {
        Self {
            user_repository,
            jwt_secret,
            token_ttl_seconds,
        }
    }

    /// Creates an account with a normalized email and a hashed password.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn create_user(&self, email: &str, password: &str, flags: UserFlags) -> Result<User> {
        trace!("Starting user creation");

        let email = normalize_email(email);
        let mut errors = FieldErrors::new();
        if email.is_empty() {
            errors.add("email", "Users must have an email address.");
        }
        check_password_policy(password, &mut errors);
        errors.into_result()?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash: self.hash(password)?,
            is_active: flags.is_active,
            is_staff: flags.is_staff,
            is_superuser: flags.is_superuser,
        };

        debug!(user_id = %user.id, email = %user.email, "Saving user to repository");
        self.save_unique(&user).await?;

        info!(
            user_id = %user.id,
            email = %user.email,
            is_staff = user.is_staff,
            is_superuser = user.is_superuser,
            "User created"
        );
        Ok(user)
    }

    pub async fn create_superuser(&self, email: &str, password: &str) -> Result<User> {
        self.create_user(email, password, UserFlags::superuser()).await
    }

    pub async fn register_user(&self, req: CreateUser) -> Result<User> {
        self.create_user(&req.email, &req.password, UserFlags::default())
            .await
    }

    /// Verifies `plaintext` against the stored hash. A malformed hash counts as a mismatch.
    pub fn check_password(&self, user: &User, plaintext: &str) -> bool {
        match verify_password(plaintext, &user.password_hash) {
            Ok(valid) => valid,
            Err(e) => {
                error!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
                false
            }
        }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<String> {
        trace!("Starting login");

        let email = normalize_email(&req.email);
        let user = self
            .user_repository
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| {
                warn!(email = %email, "User not found during login");
                DomainError::Unauthorized(INVALID_CREDENTIALS.to_string())
            })?;

        if !self.check_password(&user, &req.password) {
            warn!(user_id = %user.id, "Invalid password during login");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
        }

        if !user.is_active {
            warn!(user_id = %user.id, "Inactive user attempted login");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
        }

        let token =
            generate_token(&user.id, &self.jwt_secret, self.token_ttl_seconds).map_err(|e| {
                error!(error = %e, "Failed to generate token");
                DomainError::Internal(format!("Failed to generate token: {}", e))
            })?;

        info!(user_id = %user.id, "Login successful");
        Ok(token)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.user_repository
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = user_id, "User not found");
                DomainError::NotFound(format!("User not found: {}", user_id)).into()
            })
    }

    /// Updates the caller's own email and/or password.
    #[instrument(skip(self, req))]
    pub async fn update_user(&self, user_id: &str, req: UpdateUser) -> Result<User> {
        let mut user = self.get_user(user_id).await?;

        let email = req.email.as_deref().map(normalize_email);
        let mut errors = FieldErrors::new();
        if email.as_deref() == Some("") {
            errors.add("email", "This field may not be blank.");
        }
        if let Some(password) = req.password.as_deref() {
            check_password_policy(password, &mut errors);
        }
        errors.into_result()?;

        if let Some(email) = email {
            if email != user.email {
                debug!(user_id = %user.id, email = %email, "Changing email");
                user.email = email;
            }
        }
        if let Some(password) = req.password.as_deref() {
            user.password_hash = self.hash(password)?;
            debug!(user_id = %user.id, "Password changed");
        }

        self.save_unique(&user).await?;
        info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    async fn save_unique(&self, user: &User) -> Result<()> {
        if self.user_repository.save_user(user.clone()).await? {
            return Ok(());
        }
        warn!(email = %user.email, "User already exists");
        Err(DomainError::field("email", "User with this email already exists.").into())
    }

    fn hash(&self, password: &str) -> Result<String> {
        hash_password(password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e)).into()
        })
    }
}

fn check_password_policy(password: &str, errors: &mut FieldErrors) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!(
                "Ensure this field has at least {} characters.",
                MIN_PASSWORD_LENGTH
            ),
        );
    }
}
