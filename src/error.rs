use thiserror::Error;

/// Raised when a component is constructed without the containers it needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("{component}: required container `{element}` is missing")]
    MissingContainer {
        component: &'static str,
        element: &'static str,
    },
}

/// A single item could not be shown. Sequencers recover from these by
/// revealing everything at once and completing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RevealError {
    #[error("slot {index} has nothing to show")]
    Blank { index: usize },
    #[error("container has no visible area")]
    Collapsed,
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read customization: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed customization: {0}")]
    Json(#[from] serde_json::Error),
    #[error("customization has no slide messages and no letter text")]
    Empty,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("nothing to present (slides: {slides}; letter: {letter})")]
    NothingToShow { slides: InitError, letter: InitError },
}
