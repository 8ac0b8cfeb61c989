//! 256-bit target arithmetic
//!
//! Compact-bits expansion and the weighted-target comparison used by the
//! proof-of-stake kernel. All arithmetic here is consensus-critical:
//! multiplication is performed modulo 2^256 and comparisons treat digests
//! as unsigned big-endian integers, identically on every node.

use crate::crypto::Hash;

/// Unsigned 256-bit integer, little-endian u64 limbs
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Uint256(pub [u64; 4]);

impl Uint256 {
    /// The zero value
    pub const fn zero() -> Self {
        Uint256([0u64; 4])
    }

    /// Build from a single u64
    pub const fn from_u64(value: u64) -> Self {
        Uint256([value, 0, 0, 0])
    }

    /// Expand a compact difficulty encoding into a full target
    ///
    /// Standard compact form: the high byte is a base-256 exponent, the low
    /// 23 bits are the mantissa. A set sign bit or zero mantissa yields the
    /// zero target (nothing satisfies it).
    pub fn from_compact(bits: u32) -> Self {
        let exponent = bits >> 24;
        let mantissa = bits & 0x007f_ffff;

        if mantissa == 0 || (bits & 0x0080_0000) != 0 {
            return Self::zero();
        }

        if exponent <= 3 {
            Self::from_u64((mantissa >> (8 * (3 - exponent))) as u64)
        } else {
            Self::from_u64(mantissa as u64).shl(8 * (exponent - 3))
        }
    }

    /// Interpret a digest as an unsigned big-endian integer
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let start = (3 - i) * 8;
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[start..start + 8]);
            *limb = u64::from_be_bytes(chunk);
        }
        Uint256(limbs)
    }

    /// Interpret a [`Hash`] as an unsigned big-endian integer
    pub fn from_hash(hash: &Hash) -> Self {
        Self::from_be_bytes(&hash.0)
    }

    /// Shift left by `shift` bits; bits shifted past 2^256 are dropped
    pub fn shl(self, shift: u32) -> Self {
        if shift >= 256 {
            return Self::zero();
        }
        let limb_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;

        let mut out = [0u64; 4];
        for i in (limb_shift..4).rev() {
            let src = i - limb_shift;
            out[i] = self.0[src] << bit_shift;
            if bit_shift > 0 && src > 0 {
                out[i] |= self.0[src - 1] >> (64 - bit_shift);
            }
        }
        Uint256(out)
    }

    /// Multiply by a u64, modulo 2^256
    pub fn mul_u64(self, rhs: u64) -> Self {
        let mut out = [0u64; 4];
        let mut carry: u128 = 0;
        for i in 0..4 {
            let product = (self.0[i] as u128) * (rhs as u128) + carry;
            out[i] = product as u64;
            carry = product >> 64;
        }
        Uint256(out)
    }

    /// True for the zero value
    pub fn is_zero(&self) -> bool {
        self.0 == [0u64; 4]
    }
}

impl PartialOrd for Uint256 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Uint256 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Compare limbs from most significant down
        for i in (0..4).rev() {
            match self.0[i].cmp(&other.0[i]) {
                std::cmp::Ordering::Equal => continue,
                ord => return ord,
            }
        }
        std::cmp::Ordering::Equal
    }
}

impl std::fmt::Display for Uint256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:016x}{:016x}{:016x}{:016x}",
            self.0[3], self.0[2], self.0[1], self.0[0]
        )
    }
}
