//! Demo accounts: registration, sign-in and the current session.
//!
//! Credentials sit in their own slot, keyed by lowercase email, and never
//! inside a [`User`] record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::error::{MatchdayError, Result};
use crate::keys::SlotKey;
use crate::model::{ProfileUpdate, User};
use crate::seed;
use crate::store::Store;

type Credentials = BTreeMap<String, String>;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn require(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MatchdayError::MissingField(field));
    }
    Ok(())
}

#[instrument(skip(store, password, now))]
pub(crate) fn register(
    store: &Store,
    username: &str,
    email: &str,
    password: &str,
    now: DateTime<Utc>,
) -> Result<User> {
    require(username, "username")?;
    require(email, "email")?;
    require(password, "password")?;

    let email = normalize_email(email);
    let mut credentials: Credentials = store.read(SlotKey::Credentials, Credentials::new());
    if credentials.contains_key(&email) {
        return Err(MatchdayError::EmailTaken(email));
    }

    let user = User::new(username, &email, now);
    credentials.insert(email, password.to_owned());
    store.write(SlotKey::Credentials, &credentials);
    store.update(SlotKey::Users, Vec::new(), |mut users: Vec<User>| {
        users.push(user.clone());
        users
    });
    store.write(SlotKey::User, &Some(&user));

    info!(user_id = %user.id, "registered user");
    Ok(user)
}

#[instrument(skip(store, password))]
pub(crate) fn sign_in(store: &Store, email: &str, password: &str) -> Result<User> {
    let email = normalize_email(email);
    let credentials: Credentials = store.read(SlotKey::Credentials, Credentials::new());
    if credentials.get(&email).map(String::as_str) != Some(password) {
        return Err(MatchdayError::InvalidCredentials);
    }

    let users: Vec<User> = store.read(SlotKey::Users, Vec::new());
    let user = users
        .into_iter()
        .find(|u| u.email == email)
        .ok_or(MatchdayError::InvalidCredentials)?;
    store.write(SlotKey::User, &Some(&user));

    debug!(user_id = %user.id, "signed in");
    Ok(user)
}

pub(crate) fn sign_out(store: &Store) {
    store.remove(SlotKey::User);
}

pub(crate) fn current_user(store: &Store) -> Option<User> {
    store.read(SlotKey::User, None)
}

pub(crate) fn require_user(store: &Store) -> Result<User> {
    current_user(store).ok_or(MatchdayError::NotSignedIn)
}

fn apply_field(field: &mut Option<String>, update: Option<String>) {
    if let Some(value) = update {
        let value = value.trim();
        *field = (!value.is_empty()).then(|| value.to_owned());
    }
}

pub(crate) fn update_profile(store: &Store, update: ProfileUpdate) -> Result<User> {
    save_user(store, |user| {
        apply_field(&mut user.display_name, update.display_name);
        apply_field(&mut user.bio, update.bio);
        apply_field(&mut user.avatar, update.avatar);
        Ok(())
    })
}

pub(crate) fn set_favorite_team(store: &Store, team_id: Option<u32>) -> Result<User> {
    if let Some(id) = team_id {
        if !seed::teams().iter().any(|t| t.id == id) {
            return Err(MatchdayError::TeamNotFound(id));
        }
    }
    save_user(store, |user| {
        user.favorite_team_id = team_id;
        Ok(())
    })
}

/// Apply `change` to the signed-in user and persist it to both the session
/// and the account list.
fn save_user<F>(store: &Store, change: F) -> Result<User>
where
    F: FnOnce(&mut User) -> Result<()>,
{
    let mut user = require_user(store)?;
    change(&mut user)?;

    store.update(SlotKey::Users, Vec::new(), |mut users: Vec<User>| {
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }
        users
    });
    store.write(SlotKey::User, &Some(&user));
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_register_signs_in_and_hides_password() {
        let store = Store::in_memory();
        let user = register(&store, "ana", " Ana@Example.com ", "pw", now()).unwrap();

        assert_eq!(user.email, "ana@example.com");
        assert_eq!(current_user(&store), Some(user.clone()));

        let raw = store.storage().load("users").unwrap().unwrap();
        assert!(!raw.contains("pw"));
        let credentials: Credentials = store.read(SlotKey::Credentials, Credentials::new());
        assert_eq!(credentials.get("ana@example.com").map(String::as_str), Some("pw"));
    }

    #[test]
    fn test_email_is_unique() {
        let store = Store::in_memory();
        register(&store, "ana", "ana@example.com", "pw", now()).unwrap();
        let err = register(&store, "other", "ANA@example.com", "x", now()).unwrap_err();
        assert!(matches!(err, MatchdayError::EmailTaken(_)));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let store = Store::in_memory();
        let err = register(&store, " ", "a@b.c", "pw", now()).unwrap_err();
        assert!(matches!(err, MatchdayError::MissingField("username")));
        assert!(!store.contains(SlotKey::Credentials));
    }

    #[test]
    fn test_sign_in_and_out() {
        let store = Store::in_memory();
        let user = register(&store, "ana", "ana@example.com", "pw", now()).unwrap();
        sign_out(&store);
        assert_eq!(current_user(&store), None);
        assert!(matches!(require_user(&store), Err(MatchdayError::NotSignedIn)));

        assert!(matches!(
            sign_in(&store, "ana@example.com", "wrong"),
            Err(MatchdayError::InvalidCredentials)
        ));
        assert!(matches!(
            sign_in(&store, "nobody@example.com", "pw"),
            Err(MatchdayError::InvalidCredentials)
        ));

        let signed_in = sign_in(&store, "ANA@example.com", "pw").unwrap();
        assert_eq!(signed_in, user);
    }

    #[test]
    fn test_session_binding_follows_sign_out() {
        let store = Store::in_memory();
        let mut session = store.bind(SlotKey::User, None::<User>);

        register(&store, "ana", "ana@example.com", "pw", now()).unwrap();
        assert!(session.sync());
        assert!(session.get().is_some());

        sign_out(&store);
        assert!(session.sync());
        assert_eq!(session.get(), &None);
    }

    #[test]
    fn test_profile_updates_persist_across_sign_in() {
        let store = Store::in_memory();
        register(&store, "ana", "ana@example.com", "pw", now()).unwrap();

        let user = update_profile(
            &store,
            ProfileUpdate {
                display_name: Some("Ana B".to_string()),
                bio: Some("Ultra".to_string()),
                avatar: None,
            },
        )
        .unwrap();
        assert_eq!(user.author_name(), "Ana B");

        let user = update_profile(
            &store,
            ProfileUpdate {
                bio: Some("".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(user.bio, None);
        assert_eq!(user.display_name.as_deref(), Some("Ana B"));

        set_favorite_team(&store, Some(5)).unwrap();
        sign_out(&store);
        let user = sign_in(&store, "ana@example.com", "pw").unwrap();
        assert_eq!(user.favorite_team_id, Some(5));
        assert_eq!(user.display_name.as_deref(), Some("Ana B"));
    }

    #[test]
    fn test_favorite_team_must_exist() {
        let store = Store::in_memory();
        register(&store, "ana", "ana@example.com", "pw", now()).unwrap();
        assert!(matches!(
            set_favorite_team(&store, Some(999)),
            Err(MatchdayError::TeamNotFound(999))
        ));
        assert_eq!(set_favorite_team(&store, None).unwrap().favorite_team_id, None);
    }
}
