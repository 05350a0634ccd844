use super::*;

// ---------------------------------------------------
// We define some machinery here for enumerating the
// different block types that can live in the composite
// ---------------------------------------------------

/// API type describing the type of a cone block.
///
/// For the semidefinite block the value is the order of the matrix, so
/// that a block `SemidefiniteBlockT(n)` occupies `n(n+1)/2` entries of
/// a global vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedConeBlockT {
    /// The nonnegative orthant.
    NonnegativeBlockT(usize),
    /// The cone of positive semidefinite matrices in svec form.
    SemidefiniteBlockT(usize),
}

pub use SupportedConeBlockT::*;

impl SupportedConeBlockT {
    // length of the block's slice in a global vector
    pub(crate) fn nvars(&self) -> usize {
        match self {
            NonnegativeBlockT(dim) => *dim,
            SemidefiniteBlockT(dim) => triangular_number(*dim),
        }
    }

    // degree of the block, i.e. its contribution to mudim
    pub(crate) fn degree(&self) -> usize {
        match self {
            NonnegativeBlockT(dim) | SemidefiniteBlockT(dim) => *dim,
        }
    }
}

impl std::fmt::Display for SupportedConeBlockT {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            NonnegativeBlockT(dim) => write!(f, "NonnegativeBlock({})", dim),
            SemidefiniteBlockT(dim) => write!(f, "SemidefiniteBlock({})", dim),
        }
    }
}

#[allow(clippy::large_enum_variant)]
#[enum_dispatch(ConeBlock<T>)]
pub enum SupportedConeBlock<T>
where
    T: FloatT,
{
    NonnegativeBlock(NonnegativeBlock<T>),
    SemidefiniteBlock(SemidefiniteBlock<T>),
}

pub fn make_block<T>(blocktype: &SupportedConeBlockT) -> SupportedConeBlock<T>
where
    T: FloatT,
{
    match *blocktype {
        NonnegativeBlockT(dim) => NonnegativeBlock::<T>::new(dim).into(),
        SemidefiniteBlockT(dim) => SemidefiniteBlock::<T>::new(dim).into(),
    }
}

#[test]
fn test_make_block() {
    let blk = make_block::<f64>(&SemidefiniteBlockT(3));
    assert_eq!(blk.get_vecdim(), 6);
    assert!(matches!(blk, SupportedConeBlock::SemidefiniteBlock(_)));

    let blk = make_block::<f64>(&NonnegativeBlockT(4));
    assert_eq!(blk.get_vecdim(), 4);
    assert_eq!(SemidefiniteBlockT(3).nvars(), 6);
    assert_eq!(SemidefiniteBlockT(3).degree(), 3);
    assert_eq!(format!("{}", NonnegativeBlockT(4)), "NonnegativeBlock(4)");
}
