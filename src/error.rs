use thiserror::Error as ThisError;

/// Failures the client knows how to name.
///
/// Fetch paths wrap these in `anyhow` with context; the provider thread turns
/// whatever reaches it into a console line instead of propagating further.
#[derive(Debug, ThisError)]
pub enum LensError {
    /// The request never produced a readable response.
    #[error("request to {endpoint} failed: {reason}")]
    Network { endpoint: String, reason: String },

    /// The API answered with a non-success status.
    #[error("http {status} from {endpoint}")]
    HttpStatus { endpoint: String, status: u16 },

    /// A body did not have the shape we read from it.
    #[error("invalid {what} json: {reason}")]
    Parse { what: &'static str, reason: String },

    #[error("{league_name} is already in favorites")]
    DuplicateFavorite { league_id: u32, league_name: String },

    /// A page needs navigation state that was never written.
    #[error("no {what} selected")]
    MissingContext { what: &'static str },

    #[error("invalid grid position '{raw}' for {player}")]
    InvalidGridPosition { player: String, raw: String },

    #[error("storage write failed: {reason}")]
    Storage { reason: String },

    #[error("missing api key (set RAPIDAPI_KEY)")]
    MissingApiKey,
}
