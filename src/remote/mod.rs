pub mod ninjas;
pub mod telegram;
pub mod usda;

pub use ninjas::{Exercise, ExerciseLookup, ExerciseQuery};
pub use telegram::{Delivery, TelegramNotifier};
pub use usda::{FoodItem, FoodLookup};

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failures from the third-party collaborators. Every remote call is a single
/// blocking attempt with a fixed timeout; there is no retry policy, so each
/// error is terminal for that call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// A required API credential is absent from the configuration.
    MissingCredential(&'static str),
    HttpStatus { status: u16, body: String },
    Transport(String),
    Parse(String),
    /// The service answered but had no matches for the query.
    NoResults,
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential(name) => write!(f, "missing {name} in the configuration"),
            Self::HttpStatus { status, body } => {
                write!(f, "remote request failed with status {status}: {body}")
            }
            Self::Transport(msg) => write!(f, "remote transport error: {msg}"),
            Self::Parse(msg) => write!(f, "remote response parse error: {msg}"),
            Self::NoResults => write!(f, "no results for that query"),
        }
    }
}

impl Error for RemoteError {}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Seam between the routine generator and the exercise database, so plan
/// generation can be tested without a network.
pub trait ExerciseFinder {
    fn find(
        &self,
        query: &ExerciseQuery,
    ) -> impl std::future::Future<Output = RemoteResult<Vec<Exercise>>> + Send;
}

pub(crate) fn truncate_body(body: String) -> String {
    body.chars().take(400).collect()
}
