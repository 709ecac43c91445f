//! User aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{AggregateIdentity, AggregateRoot};
use crate::constants::MIN_PASSWORD_LENGTH;
use crate::error::{DomainError, DomainResult};
use crate::events::UserEvent;
use crate::ports::{Clock, PasswordHasher};
use crate::value_objects::{Email, Phone};

/// A registered account.
///
/// Fields are private: every mutation goes through a method that validates,
/// re-stamps `updated_at`, and raises the matching event.
#[derive(Debug, Clone)]
pub struct User {
    identity: AggregateIdentity,
    email: Email,
    phone: Phone,
    name: String,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AggregateRoot for User {
    fn identity(&self) -> &AggregateIdentity {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut AggregateIdentity {
        &mut self.identity
    }
}

impl User {
    /// Create a new user and raise `UserRegistered`.
    pub fn register(
        email: Email,
        phone: Phone,
        name: &str,
        raw_password: &str,
        hasher: &dyn PasswordHasher,
        clock: &dyn Clock,
    ) -> DomainResult<Self> {
        let name = validate_name(name)?;
        validate_password(raw_password)?;
        let password_hash = hasher.hash(raw_password)?;
        let now = clock.now();

        let mut user = Self {
            identity: AggregateIdentity::new(Uuid::new_v4()),
            email,
            phone,
            name,
            password_hash: Some(password_hash),
            created_at: now,
            updated_at: now,
        };

        let event = UserEvent::Registered {
            email: user.email.to_string(),
            phone: user.phone.to_string(),
        };
        user.raise_event(event, clock);

        Ok(user)
    }

    /// Rebuild a persisted user. No events are raised.
    pub fn restore(
        id: Uuid,
        email: Email,
        phone: Phone,
        name: String,
        password_hash: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            identity: AggregateIdentity::new(id),
            email,
            phone,
            name,
            password_hash: (!password_hash.is_empty()).then_some(password_hash),
            created_at,
            updated_at,
        }
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn phone(&self) -> &Phone {
        &self.phone
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Rename the user. An unchanged name is a no-op.
    pub fn change_name(&mut self, name: &str, clock: &dyn Clock) -> DomainResult<()> {
        let name = validate_name(name)?;
        if name == self.name {
            return Ok(());
        }

        let old = std::mem::replace(&mut self.name, name);
        self.updated_at = clock.now();
        let event = UserEvent::NameChanged {
            old,
            new: self.name.clone(),
        };
        self.raise_event(event, clock);
        Ok(())
    }

    /// Replace the phone number. Always raises `UserPhoneChanged`.
    pub fn change_phone(&mut self, phone: Phone, clock: &dyn Clock) {
        let old = std::mem::replace(&mut self.phone, phone);
        self.updated_at = clock.now();
        let event = UserEvent::PhoneChanged {
            old: old.to_string(),
            new: self.phone.to_string(),
        };
        self.raise_event(event, clock);
    }

    pub fn set_password(
        &mut self,
        raw_password: &str,
        hasher: &dyn PasswordHasher,
        clock: &dyn Clock,
    ) -> DomainResult<()> {
        validate_password(raw_password)?;
        self.password_hash = Some(hasher.hash(raw_password)?);
        self.updated_at = clock.now();
        self.raise_event(UserEvent::PasswordChanged, clock);
        Ok(())
    }

    /// `false` when no hash is stored.
    pub fn verify_password(&self, raw_password: &str, hasher: &dyn PasswordHasher) -> bool {
        match &self.password_hash {
            Some(hash) => hasher.verify(hash, raw_password),
            None => false,
        }
    }

    /// Record a successful login. Persisted fields are untouched.
    pub fn mark_logged_in(&mut self, clock: &dyn Clock) {
        self.raise_event(UserEvent::LoggedIn, clock);
    }

    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot::from(self)
    }
}

fn validate_name(raw: &str) -> DomainResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_input("name", "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_password(raw: &str) -> DomainResult<()> {
    if raw.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::invalid_input(
            "password",
            format!("must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }
    Ok(())
}

/// Public view of a user, safe to embed in tokens and responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserSnapshot {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id(),
            email: user.email.to_string(),
            name: user.name.clone(),
            phone: user.phone.to_string(),
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{FailingHasher, FakeHasher, FixedClock};
    use chrono::Duration;

    fn new_user(clock: &FixedClock) -> User {
        User::register(
            Email::new("alice@example.com").unwrap(),
            Phone::new("+15551234567").unwrap(),
            "  Alice ",
            "password123",
            &FakeHasher,
            clock,
        )
        .unwrap()
    }

    #[test]
    fn test_register_user() {
        let clock = FixedClock::default();
        let user = new_user(&clock);

        assert_eq!(user.name(), "Alice");
        assert_eq!(user.password_hash(), Some("hashed:password123"));
        assert_eq!(user.created_at(), clock.now());
        assert_eq!(user.updated_at(), clock.now());
        assert!(user.verify_password("password123", &FakeHasher));
        assert!(!user.verify_password("wrong-password", &FakeHasher));

        let events = user.pending_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "UserRegistered");
        assert_eq!(events[0].aggregate_id, user.id());
        assert_eq!(events[0].occurred_at, clock.now());
    }

    #[test]
    fn test_register_rejects_blank_name() {
        let err = User::register(
            Email::new("alice@example.com").unwrap(),
            Phone::new("+15551234567").unwrap(),
            "   ",
            "password123",
            &FakeHasher,
            &FixedClock::default(),
        )
        .unwrap_err();

        assert_eq!(err, DomainError::invalid_input("name", "must not be empty"));
    }

    #[test]
    fn test_register_rejects_short_password() {
        let err = User::register(
            Email::new("alice@example.com").unwrap(),
            Phone::new("+15551234567").unwrap(),
            "Alice",
            "short",
            &FakeHasher,
            &FixedClock::default(),
        )
        .unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput { ref field, .. } if field == "password"));
    }

    #[test]
    fn test_hasher_failure_is_infrastructure() {
        let err = User::register(
            Email::new("alice@example.com").unwrap(),
            Phone::new("+15551234567").unwrap(),
            "Alice",
            "password123",
            &FailingHasher,
            &FixedClock::default(),
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InfrastructureFailure);
    }

    #[test]
    fn test_change_name_same_value_is_noop() {
        let clock = FixedClock::default();
        let mut user = new_user(&clock);
        user.drain_events();

        clock.advance(Duration::minutes(5));
        user.change_name(" Alice  ", &clock).unwrap();

        assert!(user.pending_events().is_empty());
        assert_eq!(user.updated_at(), user.created_at());
    }

    #[test]
    fn test_change_name_raises_event() {
        let clock = FixedClock::default();
        let mut user = new_user(&clock);
        user.drain_events();

        clock.advance(Duration::minutes(5));
        user.change_name("Alicia", &clock).unwrap();

        assert_eq!(user.name(), "Alicia");
        assert_eq!(user.updated_at(), clock.now());
        let events = user.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].event,
            UserEvent::NameChanged {
                old: "Alice".into(),
                new: "Alicia".into()
            }
        );
    }

    #[test]
    fn test_change_phone() {
        let clock = FixedClock::default();
        let mut user = new_user(&clock);
        user.drain_events();

        clock.advance(Duration::minutes(5));
        user.change_phone(Phone::new("+15551234567").unwrap(), &clock);
        assert_eq!(user.pending_events().len(), 1);
        assert_eq!(user.pending_events()[0].name(), "UserPhoneChanged");
        assert_eq!(user.updated_at(), clock.now());

        user.change_phone(Phone::new("+442071234567").unwrap(), &clock);
        assert_eq!(user.phone().as_str(), "+442071234567");
        assert_eq!(user.pending_events().len(), 2);
        assert_eq!(
            user.pending_events()[1].event.payload(),
            serde_json::json!({ "old": "+15551234567", "new": "+442071234567" })
        );
    }

    #[test]
    fn test_set_password() {
        let clock = FixedClock::default();
        let mut user = new_user(&clock);
        user.drain_events();

        assert!(user.set_password("tiny", &FakeHasher, &clock).is_err());
        assert!(user.pending_events().is_empty());

        user.set_password("new-password-1", &FakeHasher, &clock).unwrap();
        assert!(user.verify_password("new-password-1", &FakeHasher));
        assert!(!user.verify_password("password123", &FakeHasher));
        assert_eq!(user.pending_events()[0].name(), "UserPasswordChanged");
    }

    #[test]
    fn test_mark_logged_in_keeps_fields() {
        let clock = FixedClock::default();
        let mut user = new_user(&clock);
        user.drain_events();
        let before = user.updated_at();

        clock.advance(Duration::seconds(30));
        user.mark_logged_in(&clock);

        assert_eq!(user.updated_at(), before);
        let events = user.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, UserEvent::LoggedIn);
        assert_eq!(events[0].occurred_at, clock.now());
    }

    #[test]
    fn test_drain_events_empties_buffer() {
        let clock = FixedClock::default();
        let mut user = new_user(&clock);

        assert_eq!(user.drain_events().len(), 1);
        assert!(user.drain_events().is_empty());
    }

    #[test]
    fn test_restore_has_no_events() {
        let clock = FixedClock::default();
        let id = Uuid::new_v4();
        let user = User::restore(
            id,
            Email::from_db("bob@example.com".into()),
            Phone::from_db("+15559876543".into()),
            "Bob".into(),
            String::new(),
            clock.now(),
            clock.now(),
        );

        assert_eq!(user.id(), id);
        assert!(user.pending_events().is_empty());
        assert!(!user.verify_password("anything-at-all", &FakeHasher));
    }

    #[test]
    fn test_snapshot() {
        let clock = FixedClock::default();
        let user = new_user(&clock);
        let snapshot = user.snapshot();

        assert_eq!(snapshot.user_id, user.id());
        assert_eq!(snapshot.email, "alice@example.com");
        assert_eq!(snapshot.phone, "+15551234567");
        assert_eq!(snapshot.name, "Alice");
        assert_eq!(snapshot.created_at, user.created_at());
    }
}
