/// Convert a logical `(i, j, k)` index into the flat index of an `nx * ny * nz` array
/// where `i` varies fastest and `k` slowest.
///
/// This is the ordering every per-cell GRDECL section is stored in, and is also used for
/// the pillar lattice (with `nx + 1`, `ny + 1` and `k = 0`) and for the doubled depth grid.
///
/// ```
/// assert_eq!(grdecl::to_flat(10, 20, 0, 22, 74, 350), 450);
/// ```
#[inline]
pub fn to_flat(i: usize, j: usize, k: usize, nx: usize, ny: usize, _nz: usize) -> usize {
    (k * nx * ny) + (j * nx) + i
}
