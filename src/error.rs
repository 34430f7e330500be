/// Errors surfaced while converting session payloads or signing tokens.
///
/// Token verification failures are never reported through this type: a cookie
/// that does not verify is treated as if no session was presented at all.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The session payload could not be serialized to JSON.
    #[error("failed to serialize session payload")]
    Serialize(#[source] serde_json::Error),

    /// The session payload could not be deserialized from JSON.
    #[error("failed to deserialize session payload")]
    Deserialize(#[source] serde_json::Error),

    /// The claim set could not be signed into a token.
    #[error("failed to sign session token")]
    Sign(#[source] jsonwebtoken::errors::Error),
}
