//! The entry model: a sealed (on-disk) record, its open (in-memory
//! plaintext) counterpart, and the seal/open/rewrap operations between
//! them.
//!
//! Modeled as two distinct structs rather than one mutable record with an
//! `encrypted` flag (see spec §9's design notes): this keeps plaintext
//! ownership unambiguous — an [`OpenEntry`] simply cannot exist without
//! its [`SecureBytes`]-backed fields, and there is no code path where a
//! "half sealed" entry is observable.

use serde::{Deserialize, Serialize};

use crate::buffer::SecureBytes;
use crate::cipher;
use crate::codec;
use crate::error::{Error, Result};
use crate::kdf::derive_key;
use crate::mac;
use crate::random;

/// The seven recognized on-disk fields, each a base64 string. Unknown
/// fields are rejected by `#[serde(deny_unknown_fields)]`; a missing
/// field is rejected because none of these are `Option`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WireEntry {
    pub space: String,
    pub key: String,
    pub value: String,
    pub salt: String,
    pub iv: String,
    pub hmac: String,
    pub hmac_salt: String,
}

/// A sealed (ciphertext) entry, exactly as stored on disk.
#[derive(Debug, Clone)]
pub struct SealedEntry {
    pub space: Vec<u8>,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub salt: [u8; 8],
    pub iv: [u8; 8],
    pub hmac: [u8; mac::TAG_LEN],
    pub hmac_salt: [u8; 8],
}

impl SealedEntry {
    /// Parses a [`WireEntry`], validating field lengths (`io/corrupt` on
    /// malformed base64 or a wrong decoded length).
    pub fn from_wire(wire: &WireEntry) -> Result<Self> {
        let space = codec::decode(&wire.space)?;
        let key = codec::decode(&wire.key)?;
        let value = codec::decode(&wire.value)?;
        let salt = fixed8(&codec::decode(&wire.salt)?, "salt")?;
        let iv = fixed8(&codec::decode(&wire.iv)?, "iv")?;
        let hmac_salt = fixed8(&codec::decode(&wire.hmac_salt)?, "hmac_salt")?;
        let hmac_bytes = codec::decode(&wire.hmac)?;
        if hmac_bytes.len() != mac::TAG_LEN {
            return Err(Error::Corrupt(format!(
                "hmac field must decode to {} bytes, got {}",
                mac::TAG_LEN,
                hmac_bytes.len()
            )));
        }
        let mut hmac = [0u8; mac::TAG_LEN];
        hmac.copy_from_slice(&hmac_bytes);

        Ok(Self { space, key, value, salt, iv, hmac, hmac_salt })
    }

    /// Serializes to the base64-string wire form.
    pub fn to_wire(&self) -> WireEntry {
        WireEntry {
            space: codec::encode(&self.space),
            key: codec::encode(&self.key),
            value: codec::encode(&self.value),
            salt: codec::encode(&self.salt),
            iv: codec::encode(&self.iv),
            hmac: codec::encode(&self.hmac),
            hmac_salt: codec::encode(&self.hmac_salt),
        }
    }

    fn canonical(&self) -> Vec<u8> {
        mac::canonical(&self.space, &self.key, &self.value, &self.salt, &self.iv)
    }

    /// Verifies the HMAC and, on success, decrypts all three secret
    /// fields. Fails with `auth/hmac` *before* any decryption is
    /// attempted, so a wrong password or a tampered field is rejected
    /// without ever running AES-CTR over attacker-controlled ciphertext.
    pub fn open(&self, main: &[u8], wf: u8) -> Result<OpenEntry> {
        let key = derive_key(main, &self.hmac_salt, wf)?;
        let expected_tag = {
            use hmac::Mac as _;
            let mut m = hmac::Hmac::<sha2::Sha512>::new_from_slice(key.as_bytes())
                .expect("HMAC accepts any key length");
            m.update(&self.canonical());
            let tag = m.finalize().into_bytes();
            let mut out = [0u8; mac::TAG_LEN];
            out.copy_from_slice(&tag);
            out
        };
        if !mac::tags_equal(&expected_tag, &self.hmac) {
            return Err(Error::HmacMismatch);
        }

        let record_key = derive_key(main, &self.salt, wf)?;
        let space = cipher::decrypt_with(&record_key, &self.iv, &self.space)?;
        let key_field = cipher::decrypt_with(&record_key, &self.iv, &self.key)?;
        let value = cipher::decrypt_with(&record_key, &self.iv, &self.value)?;

        Ok(OpenEntry {
            space: SecureBytes::from_vec(space),
            key: SecureBytes::from_vec(key_field),
            value: SecureBytes::from_vec(value),
            salt: self.salt,
            iv: self.iv,
            hmac_salt: self.hmac_salt,
        })
    }
}

/// An open (plaintext) entry. Never persisted; exists only for the
/// duration of one operation, and every field is wiped on drop because
/// it is backed by [`SecureBytes`].
pub struct OpenEntry {
    pub space: SecureBytes,
    pub key: SecureBytes,
    pub value: SecureBytes,
    /// Crypto parameters carried forward from the sealed form this entry
    /// was opened from, so a caller that wants byte-identical ciphertext
    /// for an unmodified field can reuse them (see [`OpenEntry::reseal`]).
    /// Fresh entries (not derived from an existing sealed one) set these
    /// to freshly-generated values at construction time.
    pub salt: [u8; 8],
    pub iv: [u8; 8],
    pub hmac_salt: [u8; 8],
}

impl OpenEntry {
    /// Builds a brand-new open entry (e.g. for `set`/`generate`), with
    /// fresh crypto parameters that [`OpenEntry::seal`] will regenerate
    /// anyway; [`OpenEntry::reseal`] is not meaningful for an entry that
    /// was never sealed.
    pub fn new(space: Vec<u8>, key: Vec<u8>, value: Vec<u8>) -> Self {
        Self {
            space: SecureBytes::from_vec(space),
            key: SecureBytes::from_vec(key),
            value: SecureBytes::from_vec(value),
            salt: random_array8(),
            iv: random_array8(),
            hmac_salt: random_array8(),
        }
    }

    /// Seals this entry under `main` at work factor `wf`, generating
    /// fresh `salt`, `iv`, and `hmac_salt`.
    ///
    /// Each of the three fields is encrypted independently starting from
    /// counter `iv` — the same keystream prefix is reused across fields
    /// within one entry. This is a known format quirk (see spec §4.7,
    /// §9): existing databases were written by a code path that does
    /// this, and reproducing it exactly is required for interoperability.
    /// It must not be "fixed" silently.
    pub fn seal(&self, main: &[u8], wf: u8) -> Result<SealedEntry> {
        let salt = random_array8();
        let iv = random_array8();
        self.seal_with_params(main, wf, salt, iv, None)
    }

    /// Re-seals this entry reusing its carried `(salt, iv, hmac_salt)`,
    /// producing byte-identical ciphertext and HMAC to what it was opened
    /// from when no field's plaintext has changed. Reusing `hmac_salt`
    /// keeps the MAC key identical; reusing `(salt, iv)` keeps the record
    /// key and keystream identical, so the only way the output can differ
    /// is if a field's plaintext actually changed (see `cipher::build_frame`
    /// for why the padding doesn't introduce incidental variation).
    pub fn reseal(&self, main: &[u8], wf: u8) -> Result<SealedEntry> {
        self.seal_with_params(main, wf, self.salt, self.iv, Some(self.hmac_salt))
    }

    fn seal_with_params(
        &self,
        main: &[u8],
        wf: u8,
        salt: [u8; 8],
        iv: [u8; 8],
        hmac_salt: Option<[u8; 8]>,
    ) -> Result<SealedEntry> {
        let key = derive_key(main, &salt, wf)?;
        let ct_space = cipher::encrypt_with(&key, &iv, &self.space);
        let ct_key = cipher::encrypt_with(&key, &iv, &self.key);
        let ct_value = cipher::encrypt_with(&key, &iv, &self.value);

        let canonical = mac::canonical(&ct_space, &ct_key, &ct_value, &salt, &iv);
        let (hmac_salt, hmac) = mac::compute(main, &canonical, hmac_salt, wf)?;

        Ok(SealedEntry {
            space: ct_space,
            key: ct_key,
            value: ct_value,
            salt,
            iv,
            hmac,
            hmac_salt,
        })
    }
}

/// Opens `sealed` under `old_main`/`old_wf` and immediately re-seals it
/// under `new_main`/`new_wf` with freshly generated `salt`, `iv`, and
/// `hmac_salt`.
pub fn rewrap(sealed: &SealedEntry, old_main: &[u8], new_main: &[u8], old_wf: u8, new_wf: u8) -> Result<SealedEntry> {
    let open = sealed.open(old_main, old_wf)?;
    open.seal(new_main, new_wf)
}

fn fixed8(bytes: &[u8], field: &str) -> Result<[u8; 8]> {
    if bytes.len() != 8 {
        return Err(Error::Corrupt(format!(
            "{field} field must decode to 8 bytes, got {}",
            bytes.len()
        )));
    }
    let mut out = [0u8; 8];
    out.copy_from_slice(bytes);
    Ok(out)
}

fn random_array8() -> [u8; 8] {
    let v = random::bytes(8);
    let mut out = [0u8; 8];
    out.copy_from_slice(&v);
    out
}
