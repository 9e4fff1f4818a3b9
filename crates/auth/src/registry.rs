//! Principal registry with unique email/phone enforcement.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use corebank_core::{DomainError, DomainResult, UserId};

use crate::hash::CredentialHasher;
use crate::user::{Role, User};

/// Fields accepted at registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

/// Optional profile changes; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    by_email: HashMap<String, UserId>,
    by_phone: HashMap<String, UserId>,
}

/// Thread-safe principal store keyed by id, with unique secondary indexes on
/// email and phone number. Emails are stored lowercased.
pub struct UserRegistry {
    hasher: Arc<dyn CredentialHasher>,
    inner: RwLock<Inner>,
}

impl UserRegistry {
    pub fn new(hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            hasher,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Register a principal with the USER role.
    pub fn register(&self, new_user: NewUser) -> DomainResult<User> {
        self.insert(new_user, Role::User)
    }

    /// Seed a principal with the ADMIN role (bootstrap path).
    pub fn register_admin(&self, new_user: NewUser) -> DomainResult<User> {
        self.insert(new_user, Role::Admin)
    }

    fn insert(&self, new_user: NewUser, role: Role) -> DomainResult<User> {
        let email = new_user.email.trim().to_lowercase();
        let phone = new_user.phone_number.trim().to_string();
        // hash before taking the write lock; argon2 is deliberately slow
        let password_hash = self.hasher.hash(&new_user.password)?;

        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        if inner.by_email.contains_key(&email) {
            return Err(DomainError::conflict("email address already in use"));
        }
        if inner.by_phone.contains_key(&phone) {
            return Err(DomainError::conflict("phone number already in use"));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: email.clone(),
            password_hash,
            first_name: new_user.first_name.trim().to_string(),
            last_name: new_user.last_name.trim().to_string(),
            phone_number: phone.clone(),
            role,
            created_at: now,
            updated_at: now,
        };
        inner.by_email.insert(email, user.id);
        inner.by_phone.insert(phone, user.id);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn get(&self, id: UserId) -> DomainResult<User> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        inner.users.get(&id).cloned().ok_or(DomainError::NotFound)
    }

    pub fn find_by_email(&self, email: &str) -> DomainResult<User> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let id = inner
            .by_email
            .get(&email.trim().to_lowercase())
            .ok_or(DomainError::NotFound)?;
        inner.users.get(id).cloned().ok_or(DomainError::NotFound)
    }

    /// Check login credentials.
    ///
    /// The error never says which part was wrong: an unknown email and a bad
    /// password are both `Unauthorized`.
    pub fn verify_credentials(&self, email: &str, password: &str) -> DomainResult<User> {
        let user = self
            .find_by_email(email)
            .map_err(|_| DomainError::Unauthorized)?;
        if !self.hasher.verify(password, &user.password_hash) {
            return Err(DomainError::Unauthorized);
        }
        Ok(user)
    }

    /// Re-verify the current password, then swap in the new hash.
    pub fn change_password(
        &self,
        id: UserId,
        current: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        let user = self.get(id)?;
        if !self.hasher.verify(current, &user.password_hash) {
            return Err(DomainError::Unauthorized);
        }
        let password_hash = self.hasher.hash(new_password)?;

        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let user = inner.users.get_mut(&id).ok_or(DomainError::NotFound)?;
        user.password_hash = password_hash;
        user.updated_at = Utc::now();
        Ok(())
    }

    /// Apply profile changes, keeping the phone index unique.
    pub fn update_profile(&self, id: UserId, update: ProfileUpdate) -> DomainResult<User> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let Inner {
            users, by_phone, ..
        } = &mut *inner;

        let new_phone = update
            .phone_number
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        if let Some(phone) = &new_phone {
            if by_phone.get(phone).is_some_and(|existing| *existing != id) {
                return Err(DomainError::conflict("phone number already in use"));
            }
        }

        let user = users.get_mut(&id).ok_or(DomainError::NotFound)?;
        if let Some(first) = update.first_name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            user.first_name = first.to_string();
        }
        if let Some(last) = update.last_name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            user.last_name = last.to_string();
        }
        if let Some(phone) = new_phone {
            if phone != user.phone_number {
                by_phone.remove(&user.phone_number);
                by_phone.insert(phone.clone(), id);
                user.phone_number = phone;
            }
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    /// Every principal, oldest first (admin listing).
    pub fn list_all(&self) -> DomainResult<Vec<User>> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    pub fn count(&self) -> DomainResult<usize> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.users.len())
    }
}

fn poisoned() -> DomainError {
    DomainError::internal("user registry lock poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Argon2Hasher;

    fn registry() -> UserRegistry {
        UserRegistry::new(Arc::new(Argon2Hasher))
    }

    fn alice() -> NewUser {
        NewUser {
            email: "Alice@Example.com".to_string(),
            password: "correct-horse".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            phone_number: "+15550001111".to_string(),
        }
    }

    #[test]
    fn registration_lowercases_email() {
        let reg = registry();
        let user = reg.register(alice()).unwrap();

        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.role, Role::User);
        assert_eq!(reg.find_by_email("ALICE@example.COM").unwrap().id, user.id);
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let reg = registry();
        reg.register(alice()).unwrap();

        let mut dup = alice();
        dup.phone_number = "+15550002222".to_string();
        let err = reg.register(dup).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn duplicate_phone_is_a_conflict() {
        let reg = registry();
        reg.register(alice()).unwrap();

        let mut dup = alice();
        dup.email = "other@example.com".to_string();
        let err = reg.register(dup).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn credentials_verify_only_with_the_right_password() {
        let reg = registry();
        let user = reg.register(alice()).unwrap();

        assert_eq!(
            reg.verify_credentials("alice@example.com", "correct-horse")
                .unwrap()
                .id,
            user.id
        );
        assert_eq!(
            reg.verify_credentials("alice@example.com", "wrong").unwrap_err(),
            DomainError::Unauthorized
        );
        assert_eq!(
            reg.verify_credentials("nobody@example.com", "correct-horse")
                .unwrap_err(),
            DomainError::Unauthorized
        );
    }

    #[test]
    fn change_password_requires_the_current_one() {
        let reg = registry();
        let user = reg.register(alice()).unwrap();

        let err = reg
            .change_password(user.id, "wrong", "new-password-1")
            .unwrap_err();
        assert_eq!(err, DomainError::Unauthorized);

        reg.change_password(user.id, "correct-horse", "new-password-1")
            .unwrap();
        assert!(reg
            .verify_credentials("alice@example.com", "new-password-1")
            .is_ok());
        assert!(reg
            .verify_credentials("alice@example.com", "correct-horse")
            .is_err());
    }

    #[test]
    fn profile_update_keeps_phone_unique() {
        let reg = registry();
        let a = reg.register(alice()).unwrap();
        let mut bob = alice();
        bob.email = "bob@example.com".to_string();
        bob.phone_number = "+15550002222".to_string();
        let b = reg.register(bob).unwrap();

        // taking Alice's phone fails
        let err = reg
            .update_profile(
                b.id,
                ProfileUpdate {
                    phone_number: Some("+15550001111".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // changing to a fresh phone re-indexes
        let updated = reg
            .update_profile(
                a.id,
                ProfileUpdate {
                    first_name: Some("Alicia".to_string()),
                    phone_number: Some("+15550003333".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.first_name, "Alicia");
        assert_eq!(updated.phone_number, "+15550003333");
        assert!(updated.updated_at >= updated.created_at);

        // the old phone is free again
        let mut carol = alice();
        carol.email = "carol@example.com".to_string();
        carol.phone_number = "+15550001111".to_string();
        assert!(reg.register(carol).is_ok());
    }

    #[test]
    fn listing_is_oldest_first() {
        let reg = registry();
        let a = reg.register(alice()).unwrap();
        let mut bob = alice();
        bob.email = "bob@example.com".to_string();
        bob.phone_number = "+15550002222".to_string();
        let b = reg.register(bob).unwrap();

        let all = reg.list_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, a.id);
        assert_eq!(all[1].id, b.id);
        assert_eq!(reg.count().unwrap(), 2);
    }
}
