use thiserror::Error;

/// Classified pipeline failures, one kind per stage contract.
///
/// Every kind is terminal: decoding is deterministic, so retrying the same
/// bytes cannot succeed where the first attempt failed. The core returns
/// these structured kinds plus a diagnostic detail string; mapping them to
/// user-facing messages or HTTP statuses is the route layer's job.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Input bytes are not a decodable raster image.
    #[error("image decode failed: {0}")]
    ImageDecode(String),

    /// No QR finder-pattern triple could be located in the image.
    #[error("no QR symbol found in image")]
    SymbolNotFound,

    /// A symbol was located but its bits fail format/ECC validation.
    #[error("QR symbol could not be decoded: {0}")]
    SymbolDecode(String),

    /// Decoded text does not carry the `upi://` payment scheme.
    #[error("decoded payload is not a UPI payment URI")]
    NotUpiPayload,

    /// UPI URI lacks a payee address (`pa`) parameter.
    #[error("UPI URI has no payee address parameter")]
    MissingPayee,
}
