#![allow(non_snake_case)]

use conicblocks::{algebra::*, blocks::*};

fn mixed_types() -> Vec<SupportedConeBlockT> {
    vec![
        NonnegativeBlockT(2),
        SemidefiniteBlockT(2),
        NonnegativeBlockT(1),
    ]
}

#[test]
fn test_composite_layout() {
    let blocks = CompositeBlock::<f64>::new(&mixed_types());
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks.numel(), 6);
    assert_eq!(blocks.degree(), 5);
    assert_eq!(blocks.types(), mixed_types().as_slice());

    let dims: Vec<usize> = blocks.iter().map(|b| b.get_vecdim()).collect();
    assert_eq!(dims, [2, 3, 1]);
}

#[test]
fn test_composite_routing() {
    let mut blocks = CompositeBlock::<f64>::new(&mixed_types());

    let x = [1., 2., 3., 0.5, 4., 7.];
    assert_eq!(blocks.set_x(&x).unwrap(), 0.);

    let mut v = vec![0.; 6];
    blocks.get_vecx(&mut v);
    assert!(v.norm_inf_diff(&x) < 1e-14);

    // the centered point is the unit element of each block
    blocks.center_z(2., false);
    blocks.get_vecz(&mut v);
    assert_eq!(v, [2., 2., 2., 0., 2., 2.]);

    blocks.vecgetsax(&mut v, -1., true);
    assert!(v.norm_inf_diff(&[1., 0., -1., -0.5, -2., -5.]) < 1e-14);

    blocks.clear();
    blocks.get_vecx(&mut v);
    assert_eq!(v, [1., 1., 1., 0., 1., 1.]);
}

#[test]
fn test_composite_max_correction() {
    let mut blocks = CompositeBlock::<f64>::new(&mixed_types());

    // the nonnegative part needs a shift of 2, the semidefinite part
    // (eigenvalues -3 and 1) needs 4
    let x = [-1., 0.5, -3., 0., 1., 1.];
    let shift = blocks.set_x(&x).unwrap();
    assert!((shift - 4.).abs() < 1e-12);

    // the largest correction works for every block
    blocks.center_x(shift, true);
    let mut r = vec![1.; 6];
    assert!(blocks.apply_xiz(&mut r, false).is_ok());
}

#[test]
fn test_composite_schur_matches_blocks() {
    let types = mixed_types();
    let mut blocks = CompositeBlock::<f64>::new(&types);
    let x = [1., 2., 3., 0.5, 4., 7.];
    let z = [0.5, 1., 1., -0.2, 2., 0.1];
    blocks.set_x(&x).unwrap();
    blocks.set_z(&z).unwrap();

    #[rustfmt::skip]
    let A = Matrix::from(&[
        [1., 0., 1., 0., 1., 2.],
        [0., 1., -1., 2., 0., 1.]]);

    // brute force from the inverse scaling applied to the columns of A'
    let mut S = Matrix::<f64>::zeros((2, 2));
    let mut cols = vec![vec![0.; 6]; 2];
    for (i, col) in cols.iter_mut().enumerate() {
        for j in 0..6 {
            col[j] = A[(i, j)];
        }
        blocks.apply_xizinv(col, false).unwrap();
    }
    for i in 0..2 {
        for k in 0..2 {
            S[(i, k)] = (0..6).map(|j| A[(i, j)] * cols[k][j]).sum();
        }
    }

    let mut G = Matrix::<f64>::zeros((2, 2));
    blocks.add_AxizinvAt(&A, &mut G, false, false).unwrap();
    assert!(G.data().norm_inf_diff(S.data()) < 1e-10);

    // the transposed form gives the same system
    let mut At = Matrix::<f64>::zeros((6, 2));
    for i in 0..2 {
        for j in 0..6 {
            At[(j, i)] = A[(i, j)];
        }
    }
    let mut G2 = Matrix::<f64>::zeros((2, 2));
    blocks.add_AxizinvAt(&At, &mut G2, false, true).unwrap();
    assert!(G2.data().norm_inf_diff(G.data()) < 1e-12);
}

#[test]
fn test_composite_add_xiz_is_inverse() {
    let mut blocks = CompositeBlock::<f64>::new(&mixed_types());
    blocks.set_x(&[1., 2., 3., 0.5, 4., 7.]).unwrap();
    blocks.set_z(&[0.5, 1., 1., -0.2, 2., 0.1]).unwrap();

    // xiz as a block diagonal matrix placed after one leading row
    let mut G = Matrix::<f64>::zeros((7, 7));
    blocks.add_xiz(&mut G, 1, false).unwrap();
    assert!(G.asymmetry() < 1e-12);
    assert_eq!(G.col_slice(0).norm_inf(), 0.);

    let r0 = [0.3, -1., 2., 0.7, 1.5, -0.4];
    let mut r = r0.to_vec();
    blocks.apply_xizinv(&mut r, false).unwrap();

    let mut y = vec![0.; 7];
    let mut rr = vec![0.; 7];
    rr[1..].copy_from_slice(&r);
    G.gemv(&mut y, &rr, 1., 0.);
    assert!(y[1..].norm_inf_diff(&r0) < 1e-10);
}

#[test]
fn test_composite_step() {
    let mut blocks = CompositeBlock::<f64>::new(&mixed_types());
    blocks.center_x(1., false);
    blocks.center_z(1., false);

    // at x = z = e the scaling is the identity, so dz = mu x⁻¹ - z - dx
    let mut rhs = vec![0.; 6];
    blocks.add_muxinv(&mut rhs, 0.5, 0., false).unwrap();
    assert!(rhs.norm_inf_diff(&[0.5, 0.5, 0.5, 0., 0.5, 0.5]) < 1e-14);

    let dx = [-0.5, 0.25, 0.1, 0., -0.2, 1.];
    blocks.set_dx(&dx).unwrap();
    let mut dz = vec![0.; 6];
    blocks.get_vecdz(&mut dz).unwrap();
    let expected: Vec<f64> = dx
        .iter()
        .zip(&rhs)
        .zip([1., 1., 1., 0., 1., 1.])
        .map(|((&d, &c), e)| -d - e + c)
        .collect();
    assert!(dz.norm_inf_diff(&expected) < 1e-12);

    let mut α = f64::INFINITY;
    blocks.linesearch(&mut α).unwrap();
    // dz = -1.5 in the last entry limits the step
    assert!((α - 2. / 3.).abs() < 1e-12);

    let muinfo = blocks.get_mu_info().unwrap();
    assert_eq!(muinfo.mudim, 5);
    assert!((muinfo.mu() - 1.).abs() < 1e-14);

    let α = 0.5 * α;
    let predicted = muinfo.mu_at(α);
    blocks.do_step(α).unwrap();
    let muinfo = blocks.get_mu_info().unwrap();
    assert!((muinfo.mu() - predicted).abs() < 1e-12);
}
