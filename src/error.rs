/// All errors that can occur while reading or mutating match diary state.
#[derive(thiserror::Error, Debug)]
pub enum MatchdayError {
    /// A value could not be encoded for its slot.
    #[error("failed to serialize slot {key}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },

    /// A slot holds text that does not decode into the expected shape.
    #[error("failed to deserialize slot {key}: {source}")]
    Deserialize {
        key: String,
        source: serde_json::Error,
    },

    /// The durable backend could not read or write a slot.
    #[error("storage i/o failed for slot {key}: {source}")]
    Io {
        key: String,
        source: std::io::Error,
    },

    /// The user already reviewed this match.
    #[error("match {match_id} already has a review from this user")]
    DuplicateReview { match_id: u32 },

    /// Star ratings are whole numbers from 1 to 5.
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    /// Average ratings are kept in the 0..=5 range.
    #[error("rating average must be between 0 and 5, got {0}")]
    InvalidRatingAverage(f64),

    /// A required field was empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("match {0} not found")]
    MatchNotFound(u32),

    #[error("review {0} not found")]
    ReviewNotFound(String),

    #[error("list {0} not found")]
    ListNotFound(String),

    #[error("team {0} not found")]
    TeamNotFound(u32),

    #[error("an account already exists for {0}")]
    EmailTaken(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    /// The operation needs a signed-in user.
    #[error("no user is signed in")]
    NotSignedIn,
}

pub type Result<T> = std::result::Result<T, MatchdayError>;
