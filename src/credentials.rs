// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unwrapping of the encrypted local broker credential.
//!
//! The vendor account API hands out the local credential as a base64 blob:
//! AES-256-CBC with a fixed key and a zero IV, PKCS#7 padded. The plaintext is
//! a small JSON document whose `apPasswordHash` field is the MQTT password of
//! the device's embedded broker.

use aes::cipher::{BlockDecryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::error::CredentialError;

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Fixed key: bytes 1 through 32.
const LOCAL_CREDENTIAL_KEY: [u8; 32] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26,
    27, 28, 29, 30, 31, 32,
];

const LOCAL_CREDENTIAL_IV: [u8; 16] = [0; 16];

#[derive(Deserialize)]
struct CredentialDocument {
    #[serde(rename = "apPasswordHash")]
    password_hash: Option<String>,
}

/// Decrypts a local credential blob and returns the broker password hash.
///
/// # Errors
///
/// Returns `CredentialError` if the blob is not base64, fails to decrypt, or
/// does not contain a non-empty `apPasswordHash`.
pub fn decrypt_local_credential(blob: &str) -> Result<String, CredentialError> {
    let mut buffer = STANDARD.decode(blob.trim())?;
    let plaintext = Aes256CbcDec::new(&LOCAL_CREDENTIAL_KEY.into(), &LOCAL_CREDENTIAL_IV.into())
        .decrypt_padded_mut::<Pkcs7>(&mut buffer)
        .map_err(|_| CredentialError::Decrypt)?;
    let text = std::str::from_utf8(plaintext).map_err(|_| CredentialError::Utf8)?;
    let document: CredentialDocument = serde_json::from_str(text)?;

    document
        .password_hash
        .filter(|hash| !hash.is_empty())
        .ok_or(CredentialError::MissingPasswordHash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::cipher::BlockEncryptMut;

    type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

    fn seal(plaintext: &str) -> String {
        let ciphertext =
            Aes256CbcEnc::new(&LOCAL_CREDENTIAL_KEY.into(), &LOCAL_CREDENTIAL_IV.into())
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        STANDARD.encode(ciphertext)
    }

    #[test]
    fn unwraps_password_hash() {
        let blob = seal(r#"{"serial":"NK6-EU-MHA0000A","apPasswordHash":"abc123=="}"#);
        assert_eq!(decrypt_local_credential(&blob).unwrap(), "abc123==");
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let blob = seal(r#"{"apPasswordHash":"xyz"}"#);
        assert_eq!(decrypt_local_credential(&format!("  {blob}\n")).unwrap(), "xyz");
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            decrypt_local_credential("not base64!"),
            Err(CredentialError::Base64(_))
        ));
    }

    #[test]
    fn rejects_bad_ciphertext_length() {
        let blob = STANDARD.encode([0u8; 7]);
        assert!(matches!(
            decrypt_local_credential(&blob),
            Err(CredentialError::Decrypt)
        ));
    }

    #[test]
    fn rejects_missing_hash() {
        let blob = seal(r#"{"serial":"X"}"#);
        assert!(matches!(
            decrypt_local_credential(&blob),
            Err(CredentialError::MissingPasswordHash)
        ));
    }

    #[test]
    fn rejects_non_json_plaintext() {
        let blob = seal("hello");
        assert!(matches!(
            decrypt_local_credential(&blob),
            Err(CredentialError::Json(_))
        ));
    }
}
