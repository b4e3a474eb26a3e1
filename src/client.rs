use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::instrument;

use crate::admin::{self, CatalogStats, MatchDraft};
use crate::catalog::{self, CatalogQuery};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{MatchdayError, Result};
use crate::model::*;
use crate::reviews::{self, Reaction};
use crate::store::{FileStorage, Store};
use crate::{accounts, activity, ranking, seed};

/// The main entry point for the match diary.
///
/// `Matchday` wraps a [`Store`] and exposes the catalog, the trending and
/// top-rated sidebar, accounts, reviews, per-user activity and the admin
/// operations. Operations that act for "the user" use the signed-in session
/// and fail with [`MatchdayError::NotSignedIn`] without one.
///
/// # Examples
///
/// ```
/// use matchday::Matchday;
///
/// let diary = Matchday::in_memory();
/// diary.register("ana", "ana@example.com", "secret")?;
/// diary.rate_match(1, 5)?;
///
/// for m in diary.trending() {
///     println!("{}", m.title());
/// }
/// # Ok::<(), matchday::MatchdayError>(())
/// ```
pub struct Matchday {
    store: Store,
    clock: Arc<dyn Clock>,
    config: Config,
}

impl Matchday {
    /// Create a diary over `store` with default settings and the system clock.
    pub fn new(store: Store) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            config: Config::default(),
        }
    }

    /// A diary that forgets everything when dropped.
    pub fn in_memory() -> Self {
        Self::new(Store::in_memory())
    }

    /// Open a diary as described by `config`: file-backed when it names a
    /// storage directory, in memory otherwise.
    pub fn open(config: Config) -> Result<Self> {
        let store = match &config.storage_dir {
            Some(dir) => Store::new(FileStorage::open(dir)?),
            None => Store::in_memory(),
        };
        Ok(Self::new(store).with_config(config))
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Use a different source of "now", e.g. a fixed clock in tests.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn user(&self) -> Result<User> {
        accounts::require_user(&self.store)
    }

    // --- Catalog ---

    pub fn matches(&self) -> Vec<Match> {
        reviews::load_matches(&self.store)
    }

    pub fn get_match(&self, id: u32) -> Result<Match> {
        let matches = self.matches();
        catalog::find(&matches, id)
            .cloned()
            .ok_or(MatchdayError::MatchNotFound(id))
    }

    pub fn search(&self, query: &CatalogQuery) -> Vec<Match> {
        let matches = self.matches();
        catalog::search(&matches, query).into_iter().cloned().collect()
    }

    pub fn teams(&self) -> Vec<Team> {
        seed::teams()
    }

    // --- Sidebar ---

    /// Trending matches as of the diary's clock, `config.sidebar_limit` long.
    #[instrument(skip(self))]
    pub fn trending(&self) -> Vec<Match> {
        let matches = self.matches();
        ranking::trending(&matches, self.clock.now(), self.config.sidebar_limit)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Best-rated matches, `config.sidebar_limit` long.
    #[instrument(skip(self))]
    pub fn top_rated(&self) -> Vec<Match> {
        let matches = self.matches();
        ranking::top_rated(&matches, self.config.sidebar_limit)
            .into_iter()
            .cloned()
            .collect()
    }

    // --- Accounts ---

    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<User> {
        accounts::register(&self.store, username, email, password, self.clock.now())
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        accounts::sign_in(&self.store, email, password)
    }

    pub fn sign_out(&self) {
        accounts::sign_out(&self.store)
    }

    pub fn current_user(&self) -> Option<User> {
        accounts::current_user(&self.store)
    }

    pub fn update_profile(&self, update: ProfileUpdate) -> Result<User> {
        accounts::update_profile(&self.store, update)
    }

    /// Follow a team from [`teams`](Self::teams), or clear it with `None`.
    pub fn set_favorite_team(&self, team_id: Option<u32>) -> Result<User> {
        accounts::set_favorite_team(&self.store, team_id)
    }

    // --- Reviews ---

    #[instrument(skip(self, comment))]
    pub fn submit_review(&self, match_id: u32, rating: u8, comment: &str) -> Result<Review> {
        let user = self.user()?;
        reviews::submit_review(&self.store, &user, match_id, rating, comment, self.clock.now())
    }

    pub fn edit_review(&self, review_id: &str, rating: u8, comment: &str) -> Result<Review> {
        reviews::edit_review(&self.store, &self.user()?, review_id, rating, comment)
    }

    pub fn delete_review(&self, review_id: &str) -> Result<Review> {
        reviews::delete_review(&self.store, &self.user()?, review_id)
    }

    pub fn like_review(&self, review_id: &str) -> Result<Review> {
        reviews::react(&self.store, review_id, Reaction::Like)
    }

    pub fn dislike_review(&self, review_id: &str) -> Result<Review> {
        reviews::react(&self.store, review_id, Reaction::Dislike)
    }

    /// Reviews of a match, newest first.
    pub fn reviews_for_match(&self, match_id: u32) -> Vec<Review> {
        reviews::reviews_for_match(&self.store, match_id)
    }

    /// The signed-in user's reviews by match id.
    pub fn my_reviews(&self) -> Result<BTreeMap<u32, Review>> {
        Ok(reviews::user_reviews(&self.store, &self.user()?))
    }

    // --- Activity ---

    #[instrument(skip(self))]
    pub fn rate_match(&self, match_id: u32, stars: u8) -> Result<()> {
        activity::rate_match(&self.store, &self.user()?, match_id, stars)
    }

    pub fn my_rating(&self, match_id: u32) -> Result<Option<u8>> {
        Ok(activity::rating_for(&self.store, &self.user()?, match_id))
    }

    pub fn toggle_favorite(&self, match_id: u32) -> Result<bool> {
        activity::toggle_favorite(&self.store, &self.user()?, match_id)
    }

    pub fn is_favorite(&self, match_id: u32) -> Result<bool> {
        Ok(activity::is_favorite(&self.store, &self.user()?, match_id))
    }

    pub fn favorites(&self) -> Result<BTreeSet<u32>> {
        Ok(activity::favorites(&self.store, &self.user()?))
    }

    /// Favorite matches that still exist.
    pub fn favorite_matches(&self) -> Result<Vec<Match>> {
        let ids: Vec<u32> = self.favorites()?.into_iter().collect();
        let matches = self.matches();
        Ok(catalog::resolve(&matches, &ids).into_iter().cloned().collect())
    }

    pub fn log_watched(&self, match_id: u32) -> Result<bool> {
        activity::log_watched(&self.store, &self.user()?, match_id)
    }

    pub fn watched(&self) -> Result<BTreeSet<u32>> {
        Ok(activity::watched(&self.store, &self.user()?))
    }

    pub fn create_list(&self, name: &str, description: Option<&str>) -> Result<UserList> {
        activity::create_list(&self.store, &self.user()?, name, description, self.clock.now())
    }

    pub fn rename_list(
        &self,
        list_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<UserList> {
        activity::rename_list(&self.store, &self.user()?, list_id, name, description)
    }

    pub fn add_to_list(&self, list_id: &str, match_id: u32) -> Result<bool> {
        activity::add_to_list(&self.store, &self.user()?, list_id, match_id)
    }

    pub fn remove_from_list(&self, list_id: &str, match_id: u32) -> Result<bool> {
        activity::remove_from_list(&self.store, &self.user()?, list_id, match_id)
    }

    pub fn delete_list(&self, list_id: &str) -> Result<UserList> {
        activity::delete_list(&self.store, &self.user()?, list_id)
    }

    pub fn lists(&self) -> Result<Vec<UserList>> {
        Ok(activity::lists(&self.store, &self.user()?))
    }

    pub fn list_matches(&self, list_id: &str) -> Result<Vec<Match>> {
        activity::list_matches(&self.store, &self.user()?, list_id)
    }

    // --- Admin ---

    pub async fn add_match(&self, draft: MatchDraft) -> Result<Match> {
        admin::add_match(&self.store, draft, self.config.latency()).await
    }

    pub async fn update_match(&self, id: u32, draft: MatchDraft) -> Result<Match> {
        admin::update_match(&self.store, id, draft, self.config.latency()).await
    }

    pub async fn delete_match(&self, id: u32) -> Result<Match> {
        admin::delete_match(&self.store, id, self.config.latency()).await
    }

    /// Persist the static catalog on first run.
    pub fn seed_if_empty(&self) -> usize {
        admin::seed_if_empty(&self.store)
    }

    pub fn stats(&self) -> CatalogStats {
        admin::stats(&self.store)
    }
}

impl Default for Matchday {
    fn default() -> Self {
        Self::in_memory()
    }
}
