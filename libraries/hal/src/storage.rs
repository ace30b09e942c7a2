//! File-based storage sink interface

/// Sequential writer for capture artifacts
///
/// Implementations must give create-or-truncate semantics on `create` and
/// append-only writes afterwards. A write returns only once the bytes are
/// handed to the medium.
pub trait StorageSink {
    /// Open artifact handle
    type File;

    /// Error raised by the medium
    type Error: core::fmt::Debug;

    /// Create (or truncate) the named artifact
    async fn create(&mut self, name: &str) -> Result<Self::File, Self::Error>;

    /// Append bytes to an open artifact
    async fn write(&mut self, file: &mut Self::File, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Close the artifact, releasing the handle
    async fn close(&mut self, file: Self::File) -> Result<(), Self::Error>;
}
