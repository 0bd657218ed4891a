use thiserror::Error;

/// Error type returned by kiwi-binder public APIs.
#[derive(Debug, Error)]
pub enum KiwiError {
    /// Dynamic library could not be loaded.
    #[error("failed to load library: {0}")]
    LibraryLoad(String),
    /// Required symbol could not be resolved from the library.
    #[error("failed to load symbol: {0}")]
    SymbolLoad(String),
    /// Rust string contained an interior `NUL` byte for C interop.
    #[error("string contains NUL byte: {0}")]
    NulByte(#[from] std::ffi::NulError),
    /// User-provided arguments were invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Error reported by the Kiwi C API.
    #[error("kiwi api error: {0}")]
    Api(String),
    /// The engine produced a tag outside the known tag set.
    #[error("unknown pos tag: {0:?}")]
    UnknownTag(String),
    /// The native handle behind this value has already been released.
    #[error("{0} handle is already closed")]
    Closed(&'static str),
    /// A native call reported a failing status code.
    #[error("{operation} failed with status {code}")]
    Status {
        /// Native function that reported the status.
        operation: &'static str,
        /// Raw status value.
        code: i32,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, KiwiError>;
