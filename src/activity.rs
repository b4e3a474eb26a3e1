//! Per-user activity: star ratings, favorites, the watched log and lists.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::catalog;
use crate::error::{MatchdayError, Result};
use crate::keys::SlotKey;
use crate::model::{Match, User, UserList};
use crate::reviews::{load_matches, validate_stars, with_match};
use crate::store::Store;

type Ratings = BTreeMap<u32, u8>;

fn ensure_match(store: &Store, match_id: u32) -> Result<()> {
    let matches = load_matches(store);
    catalog::find(&matches, match_id)
        .map(|_| ())
        .ok_or(MatchdayError::MatchNotFound(match_id))
}

// --- Ratings ---

#[instrument(skip(store, user), fields(user_id = %user.id))]
pub(crate) fn rate_match(store: &Store, user: &User, match_id: u32, stars: u8) -> Result<()> {
    validate_stars(stars)?;

    let key = SlotKey::Ratings.scoped(&user.id);
    let mut ratings: Ratings = store.read(&key, Ratings::new());
    let previous = ratings.get(&match_id).copied();

    with_match(store, match_id, |m| {
        let engagement = m.engagement_mut();
        match previous {
            Some(old) => engagement.change_rating(old, stars),
            None => engagement.record_rating(stars),
        }
        Ok(())
    })?;

    ratings.insert(match_id, stars);
    store.write(&key, &ratings);
    Ok(())
}

pub(crate) fn rating_for(store: &Store, user: &User, match_id: u32) -> Option<u8> {
    let ratings: Ratings = store.read(SlotKey::Ratings.scoped(&user.id), Ratings::new());
    ratings.get(&match_id).copied()
}

// --- Favorites ---

/// Flip a match in or out of the favorites. Returns whether it is now a
/// favorite.
pub(crate) fn toggle_favorite(store: &Store, user: &User, match_id: u32) -> Result<bool> {
    let key = SlotKey::Favorites.scoped(&user.id);
    let mut favorites: BTreeSet<u32> = store.read(&key, BTreeSet::new());

    let now_favorite = if favorites.remove(&match_id) {
        false
    } else {
        ensure_match(store, match_id)?;
        favorites.insert(match_id);
        true
    };
    store.write(&key, &favorites);
    Ok(now_favorite)
}

pub(crate) fn favorites(store: &Store, user: &User) -> BTreeSet<u32> {
    store.read(SlotKey::Favorites.scoped(&user.id), BTreeSet::new())
}

pub(crate) fn is_favorite(store: &Store, user: &User, match_id: u32) -> bool {
    favorites(store, user).contains(&match_id)
}

// --- Watched log ---

/// Log a match as watched. The first log counts as a view; later ones are
/// no-ops. Returns whether this call logged it.
pub(crate) fn log_watched(store: &Store, user: &User, match_id: u32) -> Result<bool> {
    let key = SlotKey::Watched.scoped(&user.id);
    let mut watched: BTreeSet<u32> = store.read(&key, BTreeSet::new());
    if watched.contains(&match_id) {
        return Ok(false);
    }

    with_match(store, match_id, |m| {
        m.engagement_mut().record_view();
        Ok(())
    })?;
    watched.insert(match_id);
    store.write(&key, &watched);
    Ok(true)
}

pub(crate) fn watched(store: &Store, user: &User) -> BTreeSet<u32> {
    store.read(SlotKey::Watched.scoped(&user.id), BTreeSet::new())
}

// --- Lists ---

fn load_lists(store: &Store, user: &User) -> Vec<UserList> {
    store.read(SlotKey::Lists.scoped(&user.id), Vec::new())
}

/// Run `f` against one of the user's lists and persist them if it succeeds.
fn with_list<T, F>(store: &Store, user: &User, list_id: &str, f: F) -> Result<T>
where
    F: FnOnce(&mut UserList) -> Result<T>,
{
    let mut lists = load_lists(store, user);
    let list = lists
        .iter_mut()
        .find(|l| l.id == list_id)
        .ok_or_else(|| MatchdayError::ListNotFound(list_id.to_owned()))?;
    let out = f(list)?;
    store.write(SlotKey::Lists.scoped(&user.id), &lists);
    Ok(out)
}

pub(crate) fn create_list(
    store: &Store,
    user: &User,
    name: &str,
    description: Option<&str>,
    now: DateTime<Utc>,
) -> Result<UserList> {
    if name.trim().is_empty() {
        return Err(MatchdayError::MissingField("name"));
    }
    let list = UserList::new(name, description, now);
    store.update(
        SlotKey::Lists.scoped(&user.id),
        Vec::new(),
        |mut lists: Vec<UserList>| {
            lists.push(list.clone());
            lists
        },
    );
    debug!(list_id = %list.id, "list created");
    Ok(list)
}

pub(crate) fn rename_list(
    store: &Store,
    user: &User,
    list_id: &str,
    name: &str,
    description: Option<&str>,
) -> Result<UserList> {
    if name.trim().is_empty() {
        return Err(MatchdayError::MissingField("name"));
    }
    with_list(store, user, list_id, |list| {
        let fresh = UserList::new(name, description, list.created_at);
        list.name = fresh.name;
        list.description = fresh.description;
        Ok(list.clone())
    })
}

/// Add a match to a list. Returns `false` if it was already there.
pub(crate) fn add_to_list(store: &Store, user: &User, list_id: &str, match_id: u32) -> Result<bool> {
    ensure_match(store, match_id)?;
    with_list(store, user, list_id, |list| Ok(list.add(match_id)))
}

/// Remove a match from a list. Works for ids whose match has been deleted.
pub(crate) fn remove_from_list(
    store: &Store,
    user: &User,
    list_id: &str,
    match_id: u32,
) -> Result<bool> {
    with_list(store, user, list_id, |list| Ok(list.remove(match_id)))
}

pub(crate) fn delete_list(store: &Store, user: &User, list_id: &str) -> Result<UserList> {
    let mut lists = load_lists(store, user);
    let position = lists
        .iter()
        .position(|l| l.id == list_id)
        .ok_or_else(|| MatchdayError::ListNotFound(list_id.to_owned()))?;
    let removed = lists.remove(position);
    store.write(SlotKey::Lists.scoped(&user.id), &lists);
    Ok(removed)
}

pub(crate) fn lists(store: &Store, user: &User) -> Vec<UserList> {
    load_lists(store, user)
}

/// The matches of a list that still exist, in list order.
pub(crate) fn list_matches(store: &Store, user: &User, list_id: &str) -> Result<Vec<Match>> {
    let list = load_lists(store, user)
        .into_iter()
        .find(|l| l.id == list_id)
        .ok_or_else(|| MatchdayError::ListNotFound(list_id.to_owned()))?;
    let matches = load_matches(store);
    Ok(catalog::resolve(&matches, &list.match_ids)
        .into_iter()
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::EngagementCounters;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn user(name: &str) -> User {
        User::new(name, &format!("{name}@example.com"), now())
    }

    fn counters(store: &Store, match_id: u32) -> EngagementCounters {
        let matches = load_matches(store);
        EngagementCounters::of(catalog::find(&matches, match_id).unwrap())
    }

    #[test]
    fn test_rating_then_rerating() {
        let store = Store::in_memory();
        let ana = user("ana");

        rate_match(&store, &ana, 6, 3).unwrap();
        assert_eq!(rating_for(&store, &ana, 6), Some(3));
        assert_eq!(counters(&store, 6).ratings, 1);
        assert_eq!(counters(&store, 6).rating_average, 3.0);

        rate_match(&store, &ana, 6, 5).unwrap();
        assert_eq!(rating_for(&store, &ana, 6), Some(5));
        assert_eq!(counters(&store, 6).ratings, 1);
        assert_eq!(counters(&store, 6).rating_average, 5.0);

        assert!(matches!(
            rate_match(&store, &ana, 6, 9),
            Err(MatchdayError::InvalidRating(9))
        ));
        assert!(matches!(
            rate_match(&store, &ana, 77, 4),
            Err(MatchdayError::MatchNotFound(77))
        ));
        assert_eq!(rating_for(&store, &ana, 77), None);
    }

    #[test]
    fn test_ratings_are_per_user() {
        let store = Store::in_memory();
        rate_match(&store, &user("ana"), 6, 2).unwrap();
        let bo = user("bo");
        assert_eq!(rating_for(&store, &bo, 6), None);
        rate_match(&store, &bo, 6, 4).unwrap();
        assert_eq!(counters(&store, 6).ratings, 2);
        assert_eq!(counters(&store, 6).rating_average, 3.0);
    }

    #[test]
    fn test_toggle_favorite() {
        let store = Store::in_memory();
        let ana = user("ana");

        assert!(toggle_favorite(&store, &ana, 2).unwrap());
        assert!(toggle_favorite(&store, &ana, 4).unwrap());
        assert_eq!(favorites(&store, &ana), BTreeSet::from([2, 4]));
        assert!(!toggle_favorite(&store, &ana, 2).unwrap());
        assert_eq!(favorites(&store, &ana), BTreeSet::from([4]));
        assert!(is_favorite(&store, &ana, 4));
        assert!(!is_favorite(&store, &user("bo"), 4));
        assert!(toggle_favorite(&store, &ana, 99).is_err());
    }

    #[test]
    fn test_watched_counts_one_view_per_user() {
        let store = Store::in_memory();
        let ana = user("ana");
        let before = counters(&store, 5).views;

        assert!(log_watched(&store, &ana, 5).unwrap());
        assert!(!log_watched(&store, &ana, 5).unwrap());
        assert!(log_watched(&store, &user("bo"), 5).unwrap());

        assert_eq!(counters(&store, 5).views, before + 2);
        assert_eq!(watched(&store, &ana), BTreeSet::from([5]));
    }

    #[test]
    fn test_list_lifecycle() {
        let store = Store::in_memory();
        let ana = user("ana");

        assert!(matches!(
            create_list(&store, &ana, "  ", None, now()),
            Err(MatchdayError::MissingField("name"))
        ));

        let list = create_list(&store, &ana, "Finals", Some("Big nights"), now()).unwrap();
        assert!(add_to_list(&store, &ana, &list.id, 1).unwrap());
        assert!(add_to_list(&store, &ana, &list.id, 2).unwrap());
        assert!(!add_to_list(&store, &ana, &list.id, 1).unwrap());
        assert!(add_to_list(&store, &ana, &list.id, 42).is_err());

        let titles: Vec<String> = list_matches(&store, &ana, &list.id)
            .unwrap()
            .iter()
            .map(Match::title)
            .collect();
        assert_eq!(titles, vec!["Argentina vs France", "AC Milan vs Liverpool"]);

        let renamed = rename_list(&store, &ana, &list.id, "Cup finals", None).unwrap();
        assert_eq!(renamed.name, "Cup finals");
        assert_eq!(renamed.description, None);
        assert_eq!(renamed.match_ids, vec![1, 2]);

        assert!(remove_from_list(&store, &ana, &list.id, 1).unwrap());
        assert!(!remove_from_list(&store, &ana, &list.id, 1).unwrap());

        // Lists belong to their owner.
        assert!(lists(&store, &user("bo")).is_empty());
        assert!(matches!(
            delete_list(&store, &user("bo"), &list.id),
            Err(MatchdayError::ListNotFound(_))
        ));

        delete_list(&store, &ana, &list.id).unwrap();
        assert!(lists(&store, &ana).is_empty());
        assert!(list_matches(&store, &ana, &list.id).is_err());
    }

    #[test]
    fn test_list_tolerates_deleted_match() {
        let store = Store::in_memory();
        let ana = user("ana");
        let list = create_list(&store, &ana, "Mixed", None, now()).unwrap();
        add_to_list(&store, &ana, &list.id, 3).unwrap();
        add_to_list(&store, &ana, &list.id, 4).unwrap();

        let remaining: Vec<Match> = load_matches(&store)
            .into_iter()
            .filter(|m| m.id != 3)
            .collect();
        store.write(SlotKey::Matches, &remaining);

        let ids: Vec<u32> = list_matches(&store, &ana, &list.id)
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![4]);
        assert!(remove_from_list(&store, &ana, &list.id, 3).unwrap());
    }
}
