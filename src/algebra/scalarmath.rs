// sizes for packed triangular storage

/// Number of entries in the upper triangle of a `k × k` matrix
pub fn triangular_number(k: usize) -> usize {
    (k * (k + 1)) >> 1
}

#[test]
fn test_triangular_sizes() {
    assert_eq!(triangular_number(0), 0);
    assert_eq!(triangular_number(1), 1);
    assert_eq!(triangular_number(3), 6);
}
