/// Reasons a cook cannot start. Shown to the player as a transient message.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no recipe selected")]
    NothingSelected,

    #[error("already cooking")]
    AlreadyCooking,

    /// Names of the ingredients whose available count is below the requirement.
    #[error("insufficient ingredients: {}", .missing.join(", "))]
    InsufficientIngredients { missing: Vec<String> },
}

/// Errors surfaced by session operations and the browser glue.
#[derive(Debug, thiserror::Error)]
pub enum CookingError {
    #[error("cannot start cooking: {0}")]
    Validation(#[from] ValidationError),

    /// The re-entrancy guard is engaged; the request is dropped, not queued.
    #[error("processing another action")]
    Busy,

    #[error("recipe '{id}' not found")]
    UnknownRecipe { id: String },

    /// A render target referenced by id is missing from the document.
    #[error("render target '{target}' not found")]
    Lookup { target: String },

    #[error("malformed message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("host call failed: {detail}")]
    Host { detail: String },
}

impl CookingError {
    /// Transient errors are dropped silently instead of being shown to the player.
    pub fn is_transient(&self) -> bool {
        matches!(self, CookingError::Busy)
    }
}
