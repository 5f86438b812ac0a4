use rocket::http::Status;

/// Errors surfaced by the store and the repositories built on it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failure reported by the database; the message is passed through as-is.
    #[error("{0}")]
    Backend(String),

    /// The newsletter address is already on the list.
    #[error("You're already subscribed!")]
    AlreadySubscribed,

    /// A unique value (such as a post slug) is already taken.
    #[error("{0}")]
    Conflict(String),

    /// Input rejected before reaching the store.
    #[error("{0}")]
    Validation(String),

    /// Operation needs a real database but the site runs in demo mode.
    #[error("Database not connected")]
    NotConnected,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    /// Unreadable or malformed site configuration.
    #[error("config: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status used when the error reaches a route handler.
    pub fn status(&self) -> Status {
        match self {
            Error::Backend(_) | Error::Config(_) => Status::InternalServerError,
            Error::AlreadySubscribed | Error::Conflict(_) => Status::Conflict,
            Error::Validation(_) => Status::UnprocessableEntity,
            Error::NotConnected => Status::ServiceUnavailable,
            Error::InvalidCredentials | Error::InvalidToken => Status::Unauthorized,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Backend(e.to_string())
    }
}

impl From<r2d2::Error> for Error {
    fn from(e: r2d2::Error) -> Self {
        Error::Backend(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Backend(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// True when a SQLite error is a UNIQUE constraint violation.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
