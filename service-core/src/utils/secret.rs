use subtle::ConstantTimeEq;

/// Byte-for-byte comparison of a presented shared secret against the
/// configured one, in constant time for equal-length inputs.
pub fn secrets_match(presented: &str, expected: &str) -> bool {
    let presented = presented.as_bytes();
    let expected = expected.as_bytes();

    if presented.len() != expected.len() {
        return false;
    }

    presented.ct_eq(expected).into()
}
