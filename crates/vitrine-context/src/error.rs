//! Context store errors.

/// Errors returned by [`ContextVar`](crate::ContextVar) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// Nothing has been installed for this variable in the calling context.
    #[error("context variable `{name}` is not set")]
    Unset { name: &'static str },

    /// The token was issued by a different variable.
    #[error("token was not issued by context variable `{name}`")]
    ForeignToken { name: &'static str },

    /// A write from a tokio task that is not inside a scope.
    #[error("context variable `{name}` can only be set inside a scope on a tokio runtime")]
    NoScope { name: &'static str },

    /// The token was issued in another execution context (task or thread).
    #[error("token for `{name}` was issued in a different execution context")]
    WrongContext { name: &'static str },
}

impl ContextError {
    /// Name of the variable the error refers to.
    pub fn var_name(&self) -> &'static str {
        match self {
            Self::Unset { name }
            | Self::NoScope { name }
            | Self::ForeignToken { name }
            | Self::WrongContext { name } => name,
        }
    }
}
