// Ed25519 request signature verification
//
// The caller signs `timestamp || body` and sends the detached signature and
// the timestamp as hex/plain headers. The public key is loaded once at
// startup; a verifier that exists is always usable.

use crate::error::{KeyError, VerifyError};
use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH};
use tracing::warn;

pub const PUBLIC_KEY_ENV: &str = "APP_PUBLIC_KEY";
pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    pub fn from_hex(public_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(public_key.trim())?;
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::Length(bytes.len()))?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(KeyError::Invalid)?;
        Ok(Self { key })
    }

    /// Load the key from `APP_PUBLIC_KEY`
    pub fn from_env() -> Result<Self, KeyError> {
        let value = std::env::var(PUBLIC_KEY_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(KeyError::Missing(PUBLIC_KEY_ENV))?;
        Self::from_hex(&value)
    }

    /// Any decode or crypto failure counts as an invalid signature
    pub fn verify(&self, timestamp: &str, body: &[u8], signature_hex: &str) -> bool {
        match self.try_verify(timestamp, body, signature_hex) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "request signature rejected");
                false
            }
        }
    }

    fn try_verify(
        &self,
        timestamp: &str,
        body: &[u8],
        signature_hex: &str,
    ) -> Result<(), VerifyError> {
        let signature_bytes = hex::decode(signature_hex.trim())?;
        let signature = Signature::from_slice(&signature_bytes).map_err(VerifyError::Malformed)?;

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key
            .verify(&message, &signature)
            .map_err(VerifyError::Mismatch)
    }
}
