use std::fmt;

use sha1::{Digest, Sha1};

use crate::{CallKind, FunctionSig};

/// Identity of a compiled wrapper: call kind plus exact signature shape.
///
/// The key holds a shared view of the signature's backing slice; building a
/// key never copies the parameter or return lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureKey {
    kind: CallKind,
    sig: FunctionSig,
}

impl SignatureKey {
    pub fn new(kind: CallKind, sig: &FunctionSig) -> Self {
        Self {
            kind,
            sig: sig.clone(),
        }
    }

    pub fn kind(&self) -> CallKind {
        self.kind
    }

    pub fn sig(&self) -> &FunctionSig {
        &self.sig
    }

    /// 64-bit digest of the key, identical across runs and machines.
    ///
    /// Covers the call kind byte, the return count (u32, little endian) and
    /// every value kind byte, returns first.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Sha1::new();
        hasher.update([self.kind.as_u8()]);
        let return_count = u32::try_from(self.sig.return_count()).unwrap_or(u32::MAX);
        hasher.update(return_count.to_le_bytes());
        for kind in self.sig.returns().iter().chain(self.sig.params()) {
            hasher.update([kind.as_u8()]);
        }
        let digest = hasher.finalize();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(prefix)
    }
}

impl fmt::Display for SignatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.sig)
    }
}
