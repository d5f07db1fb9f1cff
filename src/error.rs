use thiserror::Error;

/// Unified error type for the geometry kernel.
#[derive(Debug, Error)]
pub enum GeomError {
    /// A face or buffer operation received malformed topology: a face with
    /// fewer than three corners, a corner index past the end of its attribute
    /// buffer, or a non-finite coordinate handed to `append`.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// A point lies outside a tree's root region, or a non-finite coordinate
    /// was handed to `insert`. The root region is fixed at build time; the
    /// caller must rebuild with an enlarged region.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    /// `nearest` or `cell_of` was called on a tree holding zero points.
    #[error("tree contains no points")]
    EmptyTree,
}

/// Convenience alias for `Result<T, GeomError>`.
pub type GeomResult<T> = Result<T, GeomError>;
