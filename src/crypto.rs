use crate::error::DecodeError;

/// Repeating-XOR key used to obfuscate page images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionKey(Vec<u8>);

impl EncryptionKey {
    pub fn from_hex(hex_key: &str) -> Result<Self, DecodeError> {
        let bytes = hex::decode(hex_key)?;
        if bytes.is_empty() {
            return Err(DecodeError::EmptyKey);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// XOR every byte at position `s` with `key[s % key.len()]`. Applying it twice is a no-op.
    pub fn apply(&self, data: &mut [u8]) {
        for (byte, k) in data.iter_mut().zip(self.0.iter().cycle()) {
            *byte ^= k;
        }
    }
}

/// Decode a downloaded page body with its hex encoded key.
pub fn decode_image(mut data: Vec<u8>, hex_key: &str) -> Result<Vec<u8>, DecodeError> {
    let key = EncryptionKey::from_hex(hex_key)?;
    key.apply(&mut data);
    Ok(data)
}
