use aes::Aes128;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use block_modes::{BlockMode, Cbc};
use block_padding::Pkcs7;

use crate::error::{Error, Result};

type Aes128Cbc = Cbc<Aes128, Pkcs7>;

/// Decrypt a base64 AES-128-CBC bearer token with a base64 key and IV.
pub fn decrypt_token(key_b64: &str, iv_b64: &str, enc_b64: &str) -> Result<String> {
    let key = STANDARD
        .decode(key_b64)
        .map_err(|e| Error::Credentials(format!("AES_KEY is not base64: {}", e)))?;
    let iv = STANDARD
        .decode(iv_b64)
        .map_err(|e| Error::Credentials(format!("AES_IV is not base64: {}", e)))?;
    let ciphertext = STANDARD
        .decode(enc_b64)
        .map_err(|e| Error::Credentials(format!("API_TOKEN_ENC is not base64: {}", e)))?;

    let cipher = Aes128Cbc::new_from_slices(&key, &iv)
        .map_err(|e| Error::Credentials(format!("bad key/iv length: {}", e)))?;
    let decrypted = cipher
        .decrypt_vec(&ciphertext)
        .map_err(|e| Error::Credentials(format!("decryption failed: {}", e)))?;

    let token = String::from_utf8(decrypted)
        .map_err(|_| Error::Credentials("decrypted token is not UTF-8".to_string()))?;
    Ok(token.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8; 16] = b"0123456789abcdef";
    const IV: &[u8; 16] = b"fedcba9876543210";

    #[test]
    fn test_decrypts_token_encrypted_with_same_key() {
        let cipher = Aes128Cbc::new_from_slices(KEY, IV).unwrap();
        let enc = cipher.encrypt_vec(b"jwt-token-value");

        let token = decrypt_token(&STANDARD.encode(KEY), &STANDARD.encode(IV), &STANDARD.encode(enc)).unwrap();
        assert_eq!(token, "jwt-token-value");
    }

    #[test]
    fn test_wrong_key_does_not_yield_token() {
        let cipher = Aes128Cbc::new_from_slices(KEY, IV).unwrap();
        let enc = cipher.encrypt_vec(b"jwt-token-value");

        let result = decrypt_token(
            &STANDARD.encode(b"ffffffffffffffff"),
            &STANDARD.encode(IV),
            &STANDARD.encode(enc),
        );
        // Wrong key usually breaks padding; when it doesn't the bytes still differ
        if let Ok(token) = result {
            assert_ne!(token, "jwt-token-value");
        }
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let err = decrypt_token("!!", "!!", "!!").unwrap_err();
        assert!(matches!(err, Error::Credentials(_)));
    }
}
