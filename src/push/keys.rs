use base64::{URL_SAFE_NO_PAD, decode_config, encode_config};
use jwt_simple::prelude::ES256KeyPair;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::types::SubscriptionKeys;

const AUTH_SECRET_LEN: usize = 16;
const UNCOMPRESSED_P256_LEN: usize = 65;

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("application server key is not base64url")]
    Encoding,
    #[error("application server key must be an uncompressed P-256 point")]
    NotP256,
    #[error("failed to derive public key: {0}")]
    Derive(#[from] web_push::WebPushError),
}

/// Keys a device hands out when it subscribes to push delivery. The private
/// half never leaves the device.
#[derive(Debug, Clone)]
pub(crate) struct SubscriptionKeyMaterial {
    pub(crate) private_key: String,
    pub(crate) keys: SubscriptionKeys,
}

pub(crate) fn generate_subscription_keys() -> Result<SubscriptionKeyMaterial, KeyError> {
    let mut rng = OsRng;
    generate_subscription_keys_with_rng(&mut rng)
}

pub(crate) fn generate_subscription_keys_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<SubscriptionKeyMaterial, KeyError> {
    let key_pair = p256_key_pair(rng);
    let private_key = encode_config(key_pair.to_bytes(), URL_SAFE_NO_PAD);
    let public_key =
        web_push::VapidSignatureBuilder::from_base64_no_sub(&private_key, URL_SAFE_NO_PAD)?
            .get_public_key();

    let mut auth = [0u8; AUTH_SECRET_LEN];
    rng.fill_bytes(&mut auth);

    Ok(SubscriptionKeyMaterial {
        private_key,
        keys: SubscriptionKeys {
            p256dh: encode_config(public_key, URL_SAFE_NO_PAD),
            auth: encode_config(auth, URL_SAFE_NO_PAD),
        },
    })
}

/// Decodes a VAPID public key the way `PushManager.subscribe` accepts it:
/// base64url, padding optional, 65-byte uncompressed point.
pub(crate) fn decode_application_server_key(key: &str) -> Result<Vec<u8>, KeyError> {
    let trimmed = key.trim().trim_end_matches('=');
    let bytes = decode_config(trimmed, URL_SAFE_NO_PAD).map_err(|_| KeyError::Encoding)?;
    if bytes.len() != UNCOMPRESSED_P256_LEN || bytes[0] != 0x04 {
        return Err(KeyError::NotP256);
    }
    Ok(bytes)
}

/// Draws scalars until one lies inside the P-256 group order.
fn p256_key_pair<R: RngCore + CryptoRng>(rng: &mut R) -> ES256KeyPair {
    let mut scalar = [0u8; 32];
    loop {
        rng.fill_bytes(&mut scalar);
        match ES256KeyPair::from_bytes(&scalar) {
            Ok(key_pair) => return key_pair,
            Err(_) => continue,
        }
    }
}
