use super::*;
use std::ops::Range;

// -------------------------------------
// default composite block type
// -------------------------------------

/// A heterogeneous collection of cone blocks laid out one after
/// another in a global vector.
pub struct CompositeBlock<T: FloatT = f64> {
    blocks: Vec<SupportedConeBlock<T>>,

    //block types, in order
    types: Vec<SupportedConeBlockT>,

    //overall length in a global vector and total degree
    pub(crate) numel: usize,
    pub(crate) degree: usize,

    //ranges for the indices of the constituent blocks
    pub(crate) rng_blocks: Vec<Range<usize>>,
}

impl<T> CompositeBlock<T>
where
    T: FloatT,
{
    pub fn new(types: &[SupportedConeBlockT]) -> Self {
        // make an internal copy to protect from user modification
        let types = types.to_vec();
        let blocks: Vec<SupportedConeBlock<T>> = types.iter().map(make_block).collect();

        // count up elements and degree
        let numel = types.iter().map(|t| t.nvars()).sum();
        let degree = types.iter().map(|t| t.degree()).sum();
        let rng_blocks = _make_rng_blocks(&blocks);

        Self {
            blocks,
            types,
            numel,
            degree,
            rng_blocks,
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, SupportedConeBlock<T>> {
        self.blocks.iter()
    }
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, SupportedConeBlock<T>> {
        self.blocks.iter_mut()
    }
    pub fn types(&self) -> &[SupportedConeBlockT] {
        &self.types
    }

    /// Length of the global vectors the blocks live in
    pub fn numel(&self) -> usize {
        self.numel
    }

    /// Sum of the block degrees
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Reset every block to its centered point
    pub fn clear(&mut self) {
        for (block, t) in self.blocks.iter_mut().zip(&self.types) {
            block.clear(t.degree());
        }
    }

    pub fn center_x(&mut self, val: T, add: bool) {
        self.blocks.iter_mut().for_each(|b| b.center_x(val, add));
    }

    pub fn center_z(&mut self, val: T, add: bool) {
        self.blocks.iter_mut().for_each(|b| b.center_z(val, add));
    }

    /// Load `x` from a global vector.  Returns the largest of the block
    /// corrections, which makes every block interior when applied with
    /// [`center_x`](Self::center_x).
    pub fn set_x(&mut self, x: &[T]) -> Result<T, ConeBlockError> {
        assert_eq!(x.len(), self.numel);
        let mut shift = T::zero();
        for (block, rng) in self.blocks.iter_mut().zip(&self.rng_blocks) {
            shift = T::max(shift, block.set_x(x, rng.start)?);
        }
        Ok(shift)
    }

    /// Load `z` from a global vector.  See [`set_x`](Self::set_x).
    pub fn set_z(&mut self, z: &[T]) -> Result<T, ConeBlockError> {
        assert_eq!(z.len(), self.numel);
        let mut shift = T::zero();
        for (block, rng) in self.blocks.iter_mut().zip(&self.rng_blocks) {
            shift = T::max(shift, block.set_z(z, rng.start)?);
        }
        Ok(shift)
    }

    pub fn vecgetsax(&self, vec: &mut [T], a: T, add: bool) {
        assert_eq!(vec.len(), self.numel);
        for (block, rng) in self.blocks.iter().zip(&self.rng_blocks) {
            block.vecgetsax(vec, rng.start, a, add);
        }
    }

    pub fn vecgetsaz(&self, vec: &mut [T], a: T, add: bool) {
        assert_eq!(vec.len(), self.numel);
        for (block, rng) in self.blocks.iter().zip(&self.rng_blocks) {
            block.vecgetsaz(vec, rng.start, a, add);
        }
    }

    pub fn get_mu_info(&mut self) -> Result<MuInfo<T>, ConeBlockError> {
        let mut info = MuInfo::new();
        for block in self.blocks.iter_mut() {
            block.get_mu_info(&mut info)?;
        }
        Ok(info)
    }

    pub fn get_nbh_info(
        &mut self,
        muinfo: &MuInfo<T>,
        nbh_ubnd: T,
        alpha: &mut T,
    ) -> Result<NbhInfo<T>, ConeBlockError> {
        let mut info = NbhInfo::default();
        for block in self.blocks.iter_mut() {
            block.get_nbh_info(muinfo, nbh_ubnd, alpha, &mut info)?;
        }
        Ok(info)
    }

    pub fn linesearch(&mut self, alpha: &mut T) -> Result<(), ConeBlockError> {
        self.blocks.iter_mut().try_for_each(|b| b.linesearch(alpha))
    }

    pub fn add_muxinv(
        &mut self,
        rhs: &mut [T],
        rhsmu: T,
        rhscorr: T,
        minus: bool,
    ) -> Result<(), ConeBlockError> {
        assert_eq!(rhs.len(), self.numel);
        for (block, rng) in self.blocks.iter_mut().zip(&self.rng_blocks) {
            block.add_muxinv(rhs, rng.start, rhsmu, rhscorr, minus)?;
        }
        Ok(())
    }

    pub fn set_dx(&mut self, rhs: &[T]) -> Result<(), ConeBlockError> {
        assert_eq!(rhs.len(), self.numel);
        for (block, rng) in self.blocks.iter_mut().zip(&self.rng_blocks) {
            block.set_dx(rhs, rng.start)?;
        }
        Ok(())
    }

    pub fn set_dx_xizsolverhs(&mut self, rhs: &[T]) -> Result<(), ConeBlockError> {
        assert_eq!(rhs.len(), self.numel);
        for (block, rng) in self.blocks.iter_mut().zip(&self.rng_blocks) {
            block.set_dx_xizsolverhs(rhs, rng.start)?;
        }
        Ok(())
    }

    pub fn apply_xizinv(&mut self, rhs: &mut [T], minus: bool) -> Result<(), ConeBlockError> {
        assert_eq!(rhs.len(), self.numel);
        for (block, rng) in self.blocks.iter_mut().zip(&self.rng_blocks) {
            block.apply_xizinv(rhs, rng.start, minus)?;
        }
        Ok(())
    }

    pub fn apply_xiz(&mut self, rhs: &mut [T], minus: bool) -> Result<(), ConeBlockError> {
        assert_eq!(rhs.len(), self.numel);
        for (block, rng) in self.blocks.iter_mut().zip(&self.rng_blocks) {
            block.apply_xiz(rhs, rng.start, minus)?;
        }
        Ok(())
    }

    pub fn do_step(&mut self, alpha: T) -> Result<(), ConeBlockError> {
        self.blocks.iter_mut().try_for_each(|b| b.do_step(alpha))
    }

    /// Accumulate `±A*xiz⁻¹*A'` for `A` with one column per global
    /// entry, or one row per entry if `Atrans`
    pub fn add_AxizinvAt(
        &mut self,
        A: &Matrix<T>,
        globalsys: &mut Matrix<T>,
        minus: bool,
        Atrans: bool,
    ) -> Result<(), ConeBlockError> {
        let m = if Atrans { A.ncols() } else { A.nrows() };
        assert_eq!(if Atrans { A.nrows() } else { A.ncols() }, self.numel);
        assert_eq!(globalsys.size(), (m, m));

        for (block, rng) in self.blocks.iter_mut().zip(&self.rng_blocks) {
            let Ablk = _block_slice(A, rng, Atrans);
            block.add_AxizinvAt(&Ablk, globalsys, minus, Atrans)?;
        }
        Ok(())
    }

    /// Add `±xiz` as the block diagonal of `globalsys` starting at `startindex`
    pub fn add_xiz(
        &mut self,
        globalsys: &mut Matrix<T>,
        startindex: usize,
        minus: bool,
    ) -> Result<(), ConeBlockError> {
        for (block, rng) in self.blocks.iter_mut().zip(&self.rng_blocks) {
            block.add_xiz(globalsys, startindex + rng.start, minus)?;
        }
        Ok(())
    }

    pub fn get_vecx(&self, vec: &mut [T]) {
        assert_eq!(vec.len(), self.numel);
        for (block, rng) in self.blocks.iter().zip(&self.rng_blocks) {
            block.get_vecx(vec, rng.start);
        }
    }

    pub fn get_vecz(&self, vec: &mut [T]) {
        assert_eq!(vec.len(), self.numel);
        for (block, rng) in self.blocks.iter().zip(&self.rng_blocks) {
            block.get_vecz(vec, rng.start);
        }
    }

    pub fn get_vecdx(&self, vec: &mut [T]) -> Result<(), ConeBlockError> {
        assert_eq!(vec.len(), self.numel);
        for (block, rng) in self.blocks.iter().zip(&self.rng_blocks) {
            block.get_vecdx(vec, rng.start)?;
        }
        Ok(())
    }

    pub fn get_vecdz(&self, vec: &mut [T]) -> Result<(), ConeBlockError> {
        assert_eq!(vec.len(), self.numel);
        for (block, rng) in self.blocks.iter().zip(&self.rng_blocks) {
            block.get_vecdz(vec, rng.start)?;
        }
        Ok(())
    }
}

fn _make_rng_blocks<T>(blocks: &[SupportedConeBlock<T>]) -> Vec<Range<usize>>
where
    T: FloatT,
{
    let mut rngs = Vec::with_capacity(blocks.len());

    let mut start = 0;
    for block in blocks {
        let stop = start + block.get_vecdim();
        rngs.push(start..stop);
        start = stop;
    }
    rngs
}

// the columns (or rows if Atrans) of A belonging to one block
fn _block_slice<T>(A: &Matrix<T>, rng: &Range<usize>, Atrans: bool) -> Matrix<T>
where
    T: FloatT,
{
    if Atrans {
        let m = A.ncols();
        let mut out = Matrix::zeros((rng.len(), m));
        for j in 0..m {
            out.col_slice_mut(j).copy_from(&A.col_slice(j)[rng.clone()]);
        }
        out
    } else {
        // columns are contiguous
        let m = A.nrows();
        Matrix::new_from_slice((m, rng.len()), &A.data[rng.start * m..rng.end * m])
    }
}
