//! Object-safe JSON seams for request bodies and result destinations.
//!
//! `Serialize` and `DeserializeOwned` are not object safe, so the client and
//! the parser hooks take `&dyn Encode` / `&mut dyn Decode` instead. Both are
//! blanket-implemented; callers pass `Some(&value)` or `Some(&mut value)`.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A value that can be sent as a JSON request body.
pub trait Encode {
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;
}

impl<T: Serialize> Encode for T {
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// A destination a JSON response body is decoded into. Decoding replaces
/// the current value.
pub trait Decode {
    fn decode_json(&mut self, body: &[u8]) -> serde_json::Result<()>;
}

impl<T: DeserializeOwned> Decode for T {
    fn decode_json(&mut self, body: &[u8]) -> serde_json::Result<()> {
        *self = serde_json::from_slice(body)?;
        Ok(())
    }
}
