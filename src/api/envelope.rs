use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::error::Result;

/// A backend payload that is either bare or wrapped in `{ "data": ... }`.
///
/// Every response goes through this one parser so callers only ever see the
/// inner value.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

/// Parse a response body and unwrap the envelope.
pub fn parse<T: DeserializeOwned>(body: &str) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    Ok(envelope.into_inner())
}
