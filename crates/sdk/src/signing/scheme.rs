use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

/// Separator placed between the signature input segments.
pub const SEGMENT_SEPARATOR: &str = "_";

/// Prefix the API expects in front of versioned HMAC signatures.
pub const HMAC_SHA256_PREFIX: &str = "$02$";

/// Ordered signature input, split around the slot the secret occupies.
///
/// `identity` holds consumer key, domain, timestamp and (optionally) user id.
/// `trailing` holds the serialized request and the action, when they are
/// part of the signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureInput<'a> {
    pub identity: Vec<&'a str>,
    pub trailing: Vec<&'a str>,
}

impl<'a> SignatureInput<'a> {
    pub fn new(identity: Vec<&'a str>) -> Self {
        Self {
            identity,
            trailing: Vec::new(),
        }
    }

    pub fn push_trailing(&mut self, segment: &'a str) {
        self.trailing.push(segment);
    }

    fn join_with(&self, secret: Option<&'a str>) -> String {
        self.identity
            .iter()
            .copied()
            .chain(secret)
            .chain(self.trailing.iter().copied())
            .collect::<Vec<_>>()
            .join(SEGMENT_SEPARATOR)
    }
}

/// Turns an ordered signature input plus the consumer secret into the
/// signature string placed in the security packet.
///
/// Implementations are pure: the same input and secret always produce the
/// same signature.
pub trait SignatureScheme: Send + Sync {
    fn sign(&self, input: &SignatureInput<'_>, secret: &str) -> String;

    /// Scheme identifier (e.g. "sha256").
    fn name(&self) -> &str;
}

/// SHA-256 over the `_`-joined segments with the secret in its slot,
/// hex-encoded lower-case.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Scheme;

impl SignatureScheme for Sha256Scheme {
    fn sign(&self, input: &SignatureInput<'_>, secret: &str) -> String {
        let joined = input.join_with(Some(secret));
        hex::encode(Sha256::digest(joined.as_bytes()))
    }

    fn name(&self) -> &str {
        "sha256"
    }
}

/// Versioned scheme: HMAC-SHA256 keyed by the secret over the joined
/// segments without the secret slot, prefixed with `$02$`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha256Scheme;

impl SignatureScheme for HmacSha256Scheme {
    fn sign(&self, input: &SignatureInput<'_>, secret: &str) -> String {
        let joined = input.join_with(None);
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(joined.as_bytes());
        format!("{HMAC_SHA256_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
    }

    fn name(&self) -> &str {
        "hmac-sha256"
    }
}
