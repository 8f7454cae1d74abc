use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes256;
use blake2::{
    digest::{consts::U32, Digest},
    Blake2b,
};

type Blake2b256 = Blake2b<U32>;

/// Opaque cryptographic capabilities consumed by the generator and the
/// accumulator: a 32-byte digest and a 16-byte single-block encryption.
/// Fixed-size return types make wrong-size primitive output unrepresentable.
pub trait CryptoPrimitives: Send + Sync {
    fn hash(&self, data: &[u8]) -> [u8; 32];
    fn encrypt_block(&self, key: &[u8; 32], block: &[u8; 16]) -> [u8; 16];
}

/// Default primitives: BLAKE2b-256 for hashing, AES-256 for the block cipher.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdPrimitives;

impl CryptoPrimitives for StdPrimitives {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = Blake2b256::new();
        hasher.update(data);
        let result = hasher.finalize();
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&result);
        digest
    }

    fn encrypt_block(&self, key: &[u8; 32], block: &[u8; 16]) -> [u8; 16] {
        let cipher = Aes256::new(GenericArray::from_slice(key));
        let mut buf = GenericArray::clone_from_slice(block);
        cipher.encrypt_block(&mut buf);
        let mut out = [0u8; 16];
        out.copy_from_slice(&buf);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let p = StdPrimitives;
        assert_eq!(p.hash(b"material"), p.hash(b"material"));
    }

    #[test]
    fn test_hash_differs_by_input() {
        let p = StdPrimitives;
        assert_ne!(p.hash(b"a"), p.hash(b"b"));
    }

    #[test]
    fn test_hash_empty_input() {
        let p = StdPrimitives;
        // Hashing empty input is valid and stable (a cleared pool digests this way).
        assert_eq!(p.hash(b""), p.hash(b""));
        assert_ne!(p.hash(b""), p.hash(b"x"));
    }

    #[test]
    fn test_encrypt_block_deterministic() {
        let p = StdPrimitives;
        let key = [7u8; 32];
        let block = [1u8; 16];
        assert_eq!(p.encrypt_block(&key, &block), p.encrypt_block(&key, &block));
    }

    #[test]
    fn test_encrypt_block_key_matters() {
        let p = StdPrimitives;
        let block = [0u8; 16];
        assert_ne!(
            p.encrypt_block(&[0u8; 32], &block),
            p.encrypt_block(&[1u8; 32], &block)
        );
    }

    #[test]
    fn test_encrypt_block_not_identity() {
        let p = StdPrimitives;
        let block = [0u8; 16];
        assert_ne!(p.encrypt_block(&[0u8; 32], &block), block);
    }
}
