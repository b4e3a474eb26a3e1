use strum_macros::{AsRefStr, Display, EnumString};

/// Names of the durable slots that make up the persisted state.
///
/// User-owned data lives in per-user slots built with [`SlotKey::scoped`]
/// (`ratings:<user id>`), so two accounts on one device never share them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SlotKey {
    /// All matches, `Vec<Match>`.
    Matches,
    /// Highest match id ever assigned, `u32`. Never decreases.
    MatchSeq,
    /// Every review by every user, `Vec<Review>`.
    Reviews,
    /// The signed-in user's reviews by match id, `BTreeMap<u32, Review>`.
    UserReviews,
    /// Star ratings by match id, `BTreeMap<u32, u8>`.
    Ratings,
    /// Favorite match ids, `BTreeSet<u32>`.
    Favorites,
    /// Curated lists, `Vec<UserList>`.
    Lists,
    /// Logged match ids, `BTreeSet<u32>`.
    Watched,
    /// Current session, `Option<User>`.
    User,
    /// Registered accounts, `Vec<User>`.
    Users,
    /// Demo credentials by email, `BTreeMap<String, String>`.
    Credentials,
}

impl SlotKey {
    /// Whether the slot holds data for one user and must be [`scoped`](Self::scoped).
    pub fn is_user_scoped(self) -> bool {
        matches!(
            self,
            SlotKey::UserReviews
                | SlotKey::Ratings
                | SlotKey::Favorites
                | SlotKey::Lists
                | SlotKey::Watched
        )
    }

    /// Slot name for one user's copy of this key.
    pub fn scoped(self, user_id: &str) -> String {
        format!("{self}:{user_id}")
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_slot_key_names() {
        assert_eq!(SlotKey::Matches.to_string(), "matches");
        assert_eq!(SlotKey::UserReviews.as_ref(), "user_reviews");
        assert_eq!(SlotKey::MatchSeq.as_ref(), "match_seq");
        assert_eq!(SlotKey::from_str("credentials").unwrap(), SlotKey::Credentials);
        assert_eq!(SlotKey::Ratings.scoped("u1"), "ratings:u1");
        assert!(SlotKey::Watched.is_user_scoped());
        assert!(!SlotKey::Matches.is_user_scoped());
    }
}
