//! Errors surfaced by the chaining and binding passes.
use thiserror::Error;

/// Convenience alias for results produced anywhere in the Cascade crates.
pub type CascadeResult<T> = Result<T, Error>;

/// Errors generated by the chaining and binding passes.
///
/// Contract violations (querying an unregistered forest slot, cross-wiring
/// analyzer instances) are caller bugs and panic instead of appearing here.
#[derive(Error, PartialEq, Eq)]
pub enum Error {
    /// The dependence graph handed to us is not well formed.
    #[error("malformed dependence graph: {0}")]
    MalformedGraph(String),

    /// The cost matrix handed to the matcher is not well formed.
    #[error("malformed cost matrix: {0}")]
    MalformedMatrix(String),

    /// More operations require a resource class than there are physical
    /// units of it. Binding for the whole function is aborted.
    #[error(
        "insufficient units of resource class `{class}`: \
         {} operations require one (ids {ops:?}), {available} available",
        .ops.len()
    )]
    ResourceExhausted {
        /// Name of the offending resource class.
        class: String,
        /// Identifiers of the operations that need a unit of this class.
        ops: Vec<usize>,
        /// How many physical units the pool provides.
        available: usize,
    },
}

impl Error {
    pub fn malformed_graph<S: ToString>(msg: S) -> Self {
        Error::MalformedGraph(msg.to_string())
    }

    pub fn malformed_matrix<S: ToString>(msg: S) -> Self {
        Error::MalformedMatrix(msg.to_string())
    }

    pub fn resource_exhausted<S: ToString>(
        class: S,
        ops: Vec<usize>,
        available: usize,
    ) -> Self {
        Error::ResourceExhausted {
            class: class.to_string(),
            ops,
            available,
        }
    }
}

// Keeps `Result::unwrap` failures in tests and `main` readable.
impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
