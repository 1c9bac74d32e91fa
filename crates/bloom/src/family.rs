//! Interleaved multiplicative hash family.
//!
//! A single 64-bit multiplication yields `n_parts` separate
//! `index_length`-bit hash functions. The multiplier is an odd constant
//! approximating `2^total_bits / phi` (Fibonacci hashing), so the top
//! `total_bits` bits of the product are close to uniformly and
//! independently distributed. Member `i` is assembled by gathering every
//! `n_parts`-th bit of that full hash, starting at offset `i`, so the
//! members never share a bit of entropy.

use std::fmt;

/// Floor of `2^64 / phi` where phi is the golden ratio. Odd.
const GOLDEN_RATIO_64: u64 = 0x9E37_79B9_7F4A_7C15;

/// Width of the working hash in bits.
const WORKING_BITS: u32 = 64;

/// A family of `n_parts` hash functions, each mapping a 32-bit object id
/// to an `index_length`-bit output.
///
/// The family is a small value type: copy it freely, share it across any
/// number of threads. All outputs are deterministic in
/// `(n_parts, index_length, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashFamily {
    n_parts: u32,
    index_length: u32,
    constant: u64,
}

impl HashFamily {
    /// Create a family of `n_parts` functions of `index_length` bits each.
    ///
    /// Fails when either parameter is zero, when `index_length` exceeds
    /// the 32-bit output width, or when `n_parts * index_length` exceeds
    /// the 64-bit working hash width.
    pub fn new(n_parts: u32, index_length: u32) -> Result<Self, FamilyError> {
        if n_parts == 0 || index_length == 0 {
            return Err(FamilyError::EmptyFamily {
                n_parts,
                index_length,
            });
        }

        if index_length > 32 {
            return Err(FamilyError::IndexTooWide { index_length });
        }

        let total_bits = n_parts as u64 * index_length as u64;
        if total_bits > WORKING_BITS as u64 {
            return Err(FamilyError::WidthOverflow {
                n_parts,
                index_length,
            });
        }

        // Truncating the 64-bit constant to its top total_bits bits is the
        // integer floor of 2^total_bits / phi. Forced odd so the
        // multiplication stays a bijection mod 2^64.
        let total_bits = total_bits as u32;
        let constant = if total_bits == WORKING_BITS {
            GOLDEN_RATIO_64 | 1
        } else {
            (GOLDEN_RATIO_64 >> (WORKING_BITS - total_bits)) | 1
        };

        Ok(Self {
            n_parts,
            index_length,
            constant,
        })
    }

    /// Number of member functions.
    pub fn n_parts(&self) -> u32 {
        self.n_parts
    }

    /// Output width of each member function, in bits.
    pub fn index_length(&self) -> u32 {
        self.index_length
    }

    /// Total entropy consumed per input, in bits.
    pub fn total_bits(&self) -> u32 {
        self.n_parts * self.index_length
    }

    /// The shared multiplicative hash: top `total_bits` bits of
    /// `id * constant` in 64-bit wrapping arithmetic.
    pub fn full_hash(&self, id: u32) -> u64 {
        let product = (id as u64).wrapping_mul(self.constant);
        product >> (WORKING_BITS - self.total_bits())
    }

    /// Evaluate member function `part` on `id`.
    ///
    /// Bit `b` of the output is bit `part + b * n_parts` of the full
    /// hash, so the result is always below `2^index_length`.
    ///
    /// # Panics
    ///
    /// Panics if `part >= n_parts`.
    pub fn hash(&self, part: u32, id: u32) -> u32 {
        assert!(
            part < self.n_parts,
            "hash family has {} parts, asked for part {}",
            self.n_parts,
            part
        );

        let full = self.full_hash(id);
        let mut out = 0u32;
        for bit_position in 0..self.index_length {
            let source_bit = part + bit_position * self.n_parts;
            out |= (((full >> source_bit) & 1) as u32) << bit_position;
        }
        out
    }
}

impl fmt::Display for HashFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashFamily({}x{}b)", self.n_parts, self.index_length)
    }
}

/// Errors from invalid hash-family parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FamilyError {
    /// `n_parts * index_length` does not fit the working hash.
    #[error(
        "{n_parts} parts x {index_length} bits exceeds the 64-bit working hash"
    )]
    WidthOverflow {
        /// Requested number of member functions.
        n_parts: u32,
        /// Requested output width.
        index_length: u32,
    },

    /// Outputs are 32-bit values, so a member cannot be wider than that.
    #[error("index length {index_length} exceeds the 32-bit output width")]
    IndexTooWide {
        /// Requested output width.
        index_length: u32,
    },

    /// A family with zero members or zero-width outputs is meaningless.
    #[error("hash family parameters must be nonzero (got {n_parts} parts x {index_length} bits)")]
    EmptyFamily {
        /// Requested number of member functions.
        n_parts: u32,
        /// Requested output width.
        index_length: u32,
    },
}
