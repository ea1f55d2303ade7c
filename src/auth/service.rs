use std::collections::BTreeMap;

use lazy_static::lazy_static;
use tracing::{info, warn};

use crate::auth::dto::{LoginRequest, PublicUser, RegisterRequest};
use crate::auth::error::AuthError;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::store::{CredentialStore, StoreError};
use crate::auth::validate::{Field, Schema};

/// Demo account provisioned when the store is empty.
const SEED_EMAIL: &str = "admin@example.com";
const SEED_PASSWORD: &str = "password123";
const SEED_NAME: &str = "Admin";

lazy_static! {
    static ref REGISTER_SCHEMA: Schema = Schema::new(vec![
        Field::new("name").required("Name is required"),
        Field::new("email")
            .required("Email is required")
            .email("Please enter a valid email address"),
        Field::new("password").required("Password is required"),
    ]);
    static ref LOGIN_SCHEMA: Schema = Schema::new(vec![
        Field::new("email").required("Email is required"),
        Field::new("password").required("Password is required"),
    ]);
}

/// Registration and login against an explicitly injected store.
#[derive(Clone)]
pub struct AuthService {
    store: CredentialStore,
}

impl AuthService {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub async fn register(&self, payload: RegisterRequest) -> Result<PublicUser, AuthError> {
        let email = payload.email.trim().to_lowercase();

        let values = BTreeMap::from([
            ("name", payload.name.as_str()),
            ("email", email.as_str()),
            ("password", payload.password.as_str()),
        ]);
        if let Err(errors) = REGISTER_SCHEMA.validate(&values) {
            let message = errors.first_message().unwrap_or("Invalid input");
            warn!(message, "register rejected");
            return Err(AuthError::InvalidInput(message.to_string()));
        }

        if self.store.find_by_email(&email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(AuthError::EmailTaken);
        }

        let hash = hash_password(&payload.password)?;
        // A concurrent register losing the race fails the unique constraint
        // here and surfaces as EmailTaken all the same.
        let user = self
            .store
            .insert(&email, &hash, Some(payload.name.as_str()))
            .await?;

        info!(user_id = user.id, email = %user.email, "user registered");
        Ok(user.into())
    }

    pub async fn login(&self, payload: LoginRequest) -> Result<PublicUser, AuthError> {
        let email = payload.email.trim().to_lowercase();

        let values = BTreeMap::from([
            ("email", email.as_str()),
            ("password", payload.password.as_str()),
        ]);
        if let Err(errors) = LOGIN_SCHEMA.validate(&values) {
            let message = errors.first_message().unwrap_or("Invalid input");
            warn!(message, "login rejected");
            return Err(AuthError::InvalidInput(message.to_string()));
        }

        // The unknown-email and wrong-password legs must be indistinguishable
        // to the caller.
        let Some(user) = self.store.find_by_email(&email).await? else {
            warn!(email = %email, "login unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&payload.password, &user.password_hash)? {
            warn!(email = %email, user_id = user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = user.id, email = %user.email, "user logged in");
        Ok(user.into())
    }

    /// Provision the demo account when the table is empty. Called once by the
    /// process bootstrap, before any request is served. A concurrent seeder
    /// losing the unique-constraint race is logged and ignored.
    pub async fn ensure_seeded(&self) -> anyhow::Result<()> {
        if self.store.count().await? > 0 {
            return Ok(());
        }
        let hash = hash_password(SEED_PASSWORD)?;
        match self.store.insert(SEED_EMAIL, &hash, Some(SEED_NAME)).await {
            Ok(user) => {
                info!(user_id = user.id, email = SEED_EMAIL, "seeded demo user");
            }
            Err(StoreError::ConstraintViolation) => {
                warn!(email = SEED_EMAIL, "demo user already seeded elsewhere");
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}
