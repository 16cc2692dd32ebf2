use thiserror::Error;

/// Custom error types for the dotglow overlay engine
#[derive(Error, Debug)]
pub enum OverlayError {
    /// Error when a render request carries nothing to draw
    ///
    /// This is the only content-level rejection the overlay performs;
    /// malformed sub-fields degrade through lenient parsing and clamping.
    #[error("render request must include dots[], boxes[], or frames[]")]
    EmptyRenderRequest,

    /// Error when a tool name does not match any registered capability
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Error when tool arguments are not an object at all
    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),

    /// Error for invalid configuration values
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Error for HTTP transport failures
    #[error("network error: {0}")]
    Network(String),

    /// Error from the vision-locate collaborator
    #[error("vision API error: {0}")]
    VisionApi(String),

    /// Error when serializing data
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Type alias for Result with OverlayError
pub type Result<T> = std::result::Result<T, OverlayError>;
