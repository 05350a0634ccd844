#![allow(non_snake_case)]

use conicblocks::{algebra::*, solver::*};

fn quiet_settings() -> DefaultSettings<f64> {
    DefaultSettingsBuilder::default()
        .verbose(false)
        .build()
        .unwrap()
}

fn svec_of(M: &Matrix<f64>) -> Vec<f64> {
    let n = M.nrows();
    let mut v = vec![0.; triangular_number(n)];
    mat_to_svec(&mut v, M);
    v
}

// min <C,X>  s.t.  tr(X) = 1, X ⪰ 0 has optimal value λmin(C)
fn min_eigenvalue_data(C: &Matrix<f64>) -> (Matrix<f64>, Vec<f64>, Vec<f64>) {
    let n = C.nrows();
    let trace_row = svec_of(&Matrix::identity(n));
    let A = Matrix::new_from_slice((1, trace_row.len()), &trace_row);
    (A, vec![1.], svec_of(C))
}

#[test]
fn test_sdp_min_eigenvalue() {
    let C = Matrix::from(&[[2., 1.], [1., 2.]]);
    let (A, b, c) = min_eigenvalue_data(&C);
    let cones = [SemidefiniteBlockT(2)];

    let mut solver = DefaultSolver::new(&A, &b, &c, &cones, quiet_settings()).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!((solver.solution.obj_val - 1.).abs() <= 1e-6);
    assert!((solver.solution.obj_val_dual - 1.).abs() <= 1e-6);

    // X is the projector onto the eigenvector (1,-1)/√2
    let mut X = Matrix::<f64>::zeros((2, 2));
    svec_to_mat(&mut X, &solver.solution.x);
    let refX = Matrix::from(&[[0.5, -0.5], [-0.5, 0.5]]);
    assert!(X.data().norm_inf_diff(refX.data()) <= 1e-5);
}

#[test]
fn test_sdp_three_by_three() {
    #[rustfmt::skip]
    let C = Matrix::from(&[
        [ 4., 1., 0.],
        [ 1., 3., 1.],
        [ 0., 1., 5.]]);
    let (A, b, c) = min_eigenvalue_data(&C);
    let cones = [SemidefiniteBlockT(3)];

    let mut solver = DefaultSolver::new(&A, &b, &c, &cones, quiet_settings()).unwrap();
    solver.solve();
    assert_eq!(solver.solution.status, SolverStatus::Solved);

    let mut eng = EigEngine::<f64>::new(3);
    let mut work = C.clone();
    eng.eigvals(&mut work).unwrap();
    let λmin = eng.λ[0];

    assert!((solver.solution.obj_val - λmin).abs() <= 1e-6);

    // the dual slack C - yI is singular and positive semidefinite
    assert!((solver.solution.y[0] - λmin).abs() <= 1e-6);
}

#[test]
fn test_sdp_mixed_blocks() {
    // min <C,X> + 3s  s.t.  tr(X) + s = 1, X ⪰ 0, s ≥ 0
    let C = Matrix::from(&[[2., 1.], [1., 2.]]);
    let (_, _, mut c) = min_eigenvalue_data(&C);
    c.push(3.);
    let A = Matrix::from(&[[1., 0., 1., 1.]]);
    let b = [1.];
    let cones = [SemidefiniteBlockT(2), NonnegativeBlockT(1)];

    let mut solver = DefaultSolver::new(&A, &b, &c, &cones, quiet_settings()).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!((solver.solution.obj_val - 1.).abs() <= 1e-6);
    assert!(solver.solution.x[3].abs() <= 1e-6);
    assert!((solver.solution.z[3] - 2.).abs() <= 1e-6);
}
