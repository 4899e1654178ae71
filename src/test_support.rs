//! In-memory collaborators for exercising the auth flows in tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::notification::{DeliveryError, NotificationChannel};
use crate::user::{CredentialStore, NewUser, StoreError, User};

#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryCredentialStore {
    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(StoreError::AlreadyExists);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            first_name: Some(new_user.first_name),
            last_name: Some(new_user.last_name),
            subscription_tier: new_user.subscription_tier,
            is_email_verified: false,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        let mut users = self.users.lock().unwrap();
        Ok(match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn set_verified(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let mut users = self.users.lock().unwrap();
        Ok(users.get_mut(&id).map(|user| {
            user.is_email_verified = true;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentEmail {
    Verification { email: String, token: String },
    Reset { email: String, token: String },
    Welcome { email: String, first_name: String },
}

/// Records every successful send; individual kinds can be made to fail.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<SentEmail>>,
    fail_verification: AtomicBool,
    fail_reset: AtomicBool,
    fail_welcome: AtomicBool,
}

impl RecordingChannel {
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn verification_tokens_for(&self, to: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m {
                SentEmail::Verification { email, token } if email == to => Some(token),
                _ => None,
            })
            .collect()
    }

    pub fn reset_tokens_for(&self, to: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m {
                SentEmail::Reset { email, token } if email == to => Some(token),
                _ => None,
            })
            .collect()
    }

    pub fn fail_verification(&self) {
        self.fail_verification.store(true, Ordering::SeqCst);
    }

    pub fn fail_reset(&self) {
        self.fail_reset.store(true, Ordering::SeqCst);
    }

    pub fn fail_welcome(&self) {
        self.fail_welcome.store(true, Ordering::SeqCst);
    }

    fn record(&self, flag: &AtomicBool, email: &str, message: SentEmail) -> Result<(), DeliveryError> {
        if flag.load(Ordering::SeqCst) {
            return Err(DeliveryError::InvalidAddress(email.to_string()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), DeliveryError> {
        self.record(
            &self.fail_verification,
            email,
            SentEmail::Verification {
                email: email.to_string(),
                token: token.to_string(),
            },
        )
    }

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), DeliveryError> {
        self.record(
            &self.fail_reset,
            email,
            SentEmail::Reset {
                email: email.to_string(),
                token: token.to_string(),
            },
        )
    }

    async fn send_welcome(&self, email: &str, first_name: &str) -> Result<(), DeliveryError> {
        self.record(
            &self.fail_welcome,
            email,
            SentEmail::Welcome {
                email: email.to_string(),
                first_name: first_name.to_string(),
            },
        )
    }
}

/// A channel that never answers.
pub struct StalledChannel;

#[async_trait]
impl NotificationChannel for StalledChannel {
    async fn send_verification(&self, _email: &str, _token: &str) -> Result<(), DeliveryError> {
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        Ok(())
    }

    async fn send_password_reset(&self, _email: &str, _token: &str) -> Result<(), DeliveryError> {
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        Ok(())
    }

    async fn send_welcome(&self, _email: &str, _first_name: &str) -> Result<(), DeliveryError> {
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        Ok(())
    }
}
