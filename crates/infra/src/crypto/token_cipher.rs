use anyhow::{Context, Result, anyhow, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Seals OAuth refresh tokens with AES-256-GCM before they touch the
/// database. Output format is `nonce:tag:ciphertext`, all hex, one row
/// column. A fresh random nonce is drawn per encryption.
#[derive(Clone)]
pub struct TokenCipher {
    key: [u8; 32],
}

impl TokenCipher {
    /// Accepts either a base64-encoded 32-byte key or an arbitrary secret
    /// string, which is hashed down to 32 bytes.
    pub fn new(encryption_key: &str) -> Self {
        let key = match STANDARD.decode(encryption_key) {
            Ok(decoded) if decoded.len() == 32 => {
                let mut key = [0u8; 32];
                key.copy_from_slice(&decoded);
                key
            }
            _ => {
                let digest = Sha256::digest(encryption_key.as_bytes());
                let mut key = [0u8; 32];
                key.copy_from_slice(&digest);
                key
            }
        };
        Self { key }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.key)
            .map_err(|_| anyhow!("failed to create AES-256-GCM key"))?;
        let sealing_key = LessSafeKey::new(unbound);

        let rng = SystemRandom::new();
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rng.fill(&mut nonce_bytes)
            .map_err(|_| anyhow!("failed to generate random nonce"))?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut in_out = plaintext.as_bytes().to_vec();
        sealing_key
            .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| anyhow!("AES-256-GCM encryption failed"))?;

        let tag_start = in_out.len() - TAG_LEN;
        Ok(format!(
            "{}:{}:{}",
            hex::encode(nonce_bytes),
            hex::encode(&in_out[tag_start..]),
            hex::encode(&in_out[..tag_start])
        ))
    }

    pub fn decrypt(&self, sealed: &str) -> Result<String> {
        let parts: Vec<&str> = sealed.split(':').collect();
        if parts.len() != 3 {
            bail!("Invalid encrypted data format");
        }

        let nonce_bytes = hex::decode(parts[0]).context("Invalid encrypted data format")?;
        let tag = hex::decode(parts[1]).context("Invalid encrypted data format")?;
        let ciphertext = hex::decode(parts[2]).context("Invalid encrypted data format")?;
        if nonce_bytes.len() != NONCE_LEN || tag.len() != TAG_LEN {
            bail!("Invalid encrypted data format");
        }

        let unbound = UnboundKey::new(&AES_256_GCM, &self.key)
            .map_err(|_| anyhow!("failed to create AES-256-GCM key"))?;
        let opening_key = LessSafeKey::new(unbound);

        let mut nonce_array = [0u8; NONCE_LEN];
        nonce_array.copy_from_slice(&nonce_bytes);
        let nonce = Nonce::assume_unique_for_key(nonce_array);

        let mut in_out = ciphertext;
        in_out.extend_from_slice(&tag);
        let plaintext = opening_key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| anyhow!("AES-256-GCM decryption failed, wrong key or corrupted data"))?;

        Ok(String::from_utf8(plaintext.to_vec())?)
    }
}
