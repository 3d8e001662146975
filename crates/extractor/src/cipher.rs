//! Repeating 4-byte XOR key stream.
//!
//! The same transform hides both the index blob and every entry payload. It is
//! its own inverse, so there is no separate encrypt routine.

use std::fmt;

/// The 4-byte key read from the archive header.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct XorKey(pub [u8; 4]);

impl XorKey {
    /// XOR `bytes` in place, restarting the key at index 0 of the slice.
    pub fn apply(&self, bytes: &mut [u8]) {
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte ^= self.0[i % 4];
        }
    }

    /// Return a transformed copy of `bytes`.
    pub fn decrypt(&self, bytes: &[u8]) -> Vec<u8> {
        let mut out = bytes.to_vec();
        self.apply(&mut out);
        out
    }
}

impl fmt::Debug for XorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "XorKey({:02x}{:02x}{:02x}{:02x})",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

/// Free-function form of [`XorKey::decrypt`].
pub fn decrypt(bytes: &[u8], key: [u8; 4]) -> Vec<u8> {
    XorKey(key).decrypt(bytes)
}
