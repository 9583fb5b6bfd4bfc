//! # Sequence Encoding
//!
//! Reads and reference are scored in the classic numeric alphabet shared by
//! every kernel in the crate:
//!
//! - A=0, C=1, G=2, T=3
//! - N (and any other IUPAC symbol) = 4
//!
//! Codes above 3 are treated as ambiguous by the scoring scheme.

/// Code used for any base that is not A, C, G or T.
pub const AMBIGUOUS_CODE: u8 = 4;

/// Convert ASCII base to its numeric code.
///
/// - A/a → 0
/// - C/c → 1
/// - G/g → 2
/// - T/t → 3
/// - N/n/other → 4
#[inline]
pub fn base_to_code(base: u8) -> u8 {
    match base {
        b'A' | b'a' => 0,
        b'C' | b'c' => 1,
        b'G' | b'g' => 2,
        b'T' | b't' => 3,
        _ => AMBIGUOUS_CODE,
    }
}

/// Get complement of a numeric code (A↔T, C↔G, N stays N).
#[inline]
pub fn complement_code(code: u8) -> u8 {
    match code {
        0 => 3,
        1 => 2,
        2 => 1,
        3 => 0,
        _ => AMBIGUOUS_CODE,
    }
}

/// Encode an ASCII sequence.
pub fn encode_sequence(seq: &[u8]) -> Vec<u8> {
    seq.iter().map(|&b| base_to_code(b)).collect()
}

/// Append the encoding of an ASCII sequence to `out`.
pub fn encode_into(seq: &[u8], out: &mut Vec<u8>) {
    out.extend(seq.iter().map(|&b| base_to_code(b)));
}

/// Reverse complement of an already-encoded sequence.
pub fn reverse_complement(encoded: &[u8]) -> Vec<u8> {
    encoded.iter().rev().map(|&c| complement_code(c)).collect()
}

/// Convert a numeric code back to an upper-case ASCII base.
#[inline]
pub fn code_to_base(code: u8) -> u8 {
    match code {
        0 => b'A',
        1 => b'C',
        2 => b'G',
        3 => b'T',
        _ => b'N',
    }
}
