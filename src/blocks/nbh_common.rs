use crate::algebra::*;

// Shift along the unit element needed to move a point into the
// interior, given its margin `α` (smallest entry or eigenvalue) and
// `β`, the sum of its positive entries or eigenvalues.  The target
// margin is at least one and scales with the average positive entry.
pub(crate) fn interior_shift<T: FloatT>(α: T, β: T, degree: usize) -> T {
    if degree == 0 || α > T::zero() {
        return T::zero();
    }
    let tenth: T = (0.1).as_T();
    let target = T::max(T::one(), tenth * β / degree.as_T());
    -α + target
}

// (α, β) margins of a collection of entries or eigenvalues
pub(crate) fn margins<T: FloatT>(e: &[T]) -> (T, T) {
    let α = e.minimum();
    let β = e.iter().fold(T::zero(), |β, &ei| β + T::max(ei, T::zero()));
    (α, β)
}

// Smallest t in (0, tmax] at which the quadratic a0 + a1 t + a2 t²
// reaches zero, or tmax if it stays positive.  Requires a0 > 0.
pub(crate) fn quadratic_first_root<T: FloatT>(a0: T, a1: T, a2: T, tmax: T) -> T {
    debug_assert!(a0 > T::zero());
    let two: T = (2.).as_T();
    let four: T = (4.).as_T();

    let root = if a2 == T::zero() {
        if a1 < T::zero() {
            -a0 / a1
        } else {
            T::infinity()
        }
    } else {
        let disc = a1 * a1 - four * a2 * a0;
        if disc < T::zero() {
            T::infinity()
        } else {
            // stable pair of roots
            let q = -(a1 + a1.signum() * disc.sqrt()) / two;
            let (r1, r2) = (q / a2, a0 / q);
            let mut best = T::infinity();
            for r in [r1, r2] {
                if r > T::zero() && r < best {
                    best = r;
                }
            }
            best
        }
    };
    T::min(root, tmax)
}

// Largest fraction of the step keeping a scalar quantity
// v + t*dv nonnegative, as in a ratio test
#[inline]
pub(crate) fn ratio_step<T: FloatT>(v: T, dv: T, tmax: T) -> T {
    if dv < T::zero() {
        T::min(tmax, -v / dv)
    } else {
        tmax
    }
}
