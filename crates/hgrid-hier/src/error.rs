//! Error type for the hierarchy crate.

/// Errors surfaced by stores, configuration and the worker pool.
///
/// Unreachable pairs and cache misses are not errors: they are the
/// [`UNREACHABLE`](hgrid_paths::UNREACHABLE) sentinel and `None`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("store error: {0}")]
    Store(#[from] redb::Error),

    #[error("persistent store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
