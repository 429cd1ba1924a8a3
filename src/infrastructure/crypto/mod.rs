use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use rand::RngCore;
use sha2::{Digest, Sha256};

fn derive_key(secret: &str) -> Key<Aes256Gcm> {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    let out = hasher.finalize();
    let mut k = [0u8; 32];
    k.copy_from_slice(&out);
    Key::<Aes256Gcm>::from_slice(&k).clone()
}

/// Seals a stored secret (a hub bearer token) under the process encryption
/// key. Output format: `v1:<nonce-b64>:<ciphertext-b64>`.
pub fn seal_secret(secret: &str, plaintext: &str) -> anyhow::Result<String> {
    let key = derive_key(secret);
    let cipher = Aes256Gcm::new(&key);
    let mut nonce_bytes = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ct = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| anyhow::anyhow!("encrypt failed: {}", e))?;
    let n_b64 = base64::engine::general_purpose::STANDARD.encode(nonce_bytes);
    let c_b64 = base64::engine::general_purpose::STANDARD.encode(ct);
    Ok(format!("v1:{}:{}", n_b64, c_b64))
}

/// Unseals a value produced by [`seal_secret`]. Values without the `v1:`
/// prefix are returned as-is (rows written before sealing was introduced).
pub fn unseal_secret(secret: &str, sealed: &str) -> anyhow::Result<String> {
    if !sealed.starts_with("v1:") {
        return Ok(sealed.to_string());
    }
    let parts: Vec<&str> = sealed.splitn(3, ':').collect();
    if parts.len() != 3 {
        anyhow::bail!("invalid sealed format");
    }
    let nonce_bytes = base64::engine::general_purpose::STANDARD
        .decode(parts[1])
        .map_err(|e| anyhow::anyhow!("b64 decode nonce: {}", e))?;
    let ct_bytes = base64::engine::general_purpose::STANDARD
        .decode(parts[2])
        .map_err(|e| anyhow::anyhow!("b64 decode ciphertext: {}", e))?;
    let key = derive_key(secret);
    let cipher = Aes256Gcm::new(&key);
    let nonce = Nonce::from_slice(&nonce_bytes);
    let pt = cipher
        .decrypt(nonce, ct_bytes.as_ref())
        .map_err(|e| anyhow::anyhow!("decrypt failed: {}", e))?;
    Ok(String::from_utf8(pt)?)
}
