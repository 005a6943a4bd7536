//! Dense matrix helpers on flat row-major `f32` buffers
//!
//! `sgemm_wrapper` keeps the BLAS-style calling convention (leading dimensions,
//! transpose flags, alpha/beta) and is backed by the pure-Rust `matrixmultiply`
//! kernels, so no system BLAS is needed to build or run the crate.

/// Minimum buffer length for a `rows × cols` matrix with leading dimension `ld`.
fn required_len(rows: usize, cols: usize, ld: usize) -> usize {
    if rows == 0 || cols == 0 {
        0
    } else {
        (rows - 1) * ld + cols
    }
}

/// General matrix multiply: `C = alpha * op(A) * op(B) + beta * C`.
///
/// `op(A)` is `m × k`, `op(B)` is `k × n` and `C` is `m × n`, all row-major.
/// When `transpose_a` is set, `a` holds the stored `k × m` matrix (and likewise
/// for `b`, stored `n × k`). Leading dimensions refer to the stored layout.
///
/// When `beta == 0.0` the previous contents of `c` are ignored.
///
/// # Panics
///
/// Panics if any buffer is too short for the requested shape.
///
/// # Examples
///
/// ```
/// use sparse_attention_ae::utils::linalg::sgemm_wrapper;
///
/// let a = [1.0, 2.0, 3.0, 4.0];
/// let identity = [1.0, 0.0, 0.0, 1.0];
/// let mut c = [0.0; 4];
/// sgemm_wrapper(2, 2, 2, &a, 2, &identity, 2, &mut c, 2, false, false, 1.0, 0.0);
/// assert_eq!(c, a);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn sgemm_wrapper(
    m: usize,
    n: usize,
    k: usize,
    a: &[f32],
    lda: usize,
    b: &[f32],
    ldb: usize,
    c: &mut [f32],
    ldc: usize,
    transpose_a: bool,
    transpose_b: bool,
    alpha: f32,
    beta: f32,
) {
    let (a_rows, a_cols) = if transpose_a { (k, m) } else { (m, k) };
    let (b_rows, b_cols) = if transpose_b { (n, k) } else { (k, n) };
    assert!(
        a.len() >= required_len(a_rows, a_cols, lda),
        "sgemm: A buffer too small"
    );
    assert!(
        b.len() >= required_len(b_rows, b_cols, ldb),
        "sgemm: B buffer too small"
    );
    assert!(c.len() >= required_len(m, n, ldc), "sgemm: C buffer too small");

    if m == 0 || n == 0 {
        return;
    }

    let (rsa, csa) = if transpose_a {
        (1, lda as isize)
    } else {
        (lda as isize, 1)
    };
    let (rsb, csb) = if transpose_b {
        (1, ldb as isize)
    } else {
        (ldb as isize, 1)
    };

    // SAFETY: the assertions above guarantee every element addressed through
    // the strides lies inside the corresponding slice.
    unsafe {
        matrixmultiply::sgemm(
            m,
            k,
            n,
            alpha,
            a.as_ptr(),
            rsa,
            csa,
            b.as_ptr(),
            rsb,
            csb,
            beta,
            c.as_mut_ptr(),
            ldc as isize,
            1,
        );
    }
}

/// Add bias to each row.
pub fn add_bias(data: &mut [f32], rows: usize, cols: usize, bias: &[f32]) {
    for row in data.chunks_exact_mut(cols).take(rows) {
        for (value, b) in row.iter_mut().zip(bias) {
            *value += *b;
        }
    }
}

/// Column sums of a `rows × cols` matrix, written into `out`.
pub fn sum_rows(data: &[f32], rows: usize, cols: usize, out: &mut [f32]) {
    for value in out.iter_mut().take(cols) {
        *value = 0.0;
    }

    for row in data.chunks_exact(cols).take(rows) {
        for (value, sum) in row.iter().zip(out.iter_mut()) {
            *sum += *value;
        }
    }
}

/// Element-wise product `out[i] = a[i] * b[i]`.
pub fn hadamard(a: &[f32], b: &[f32], out: &mut [f32]) {
    assert_eq!(a.len(), b.len(), "hadamard: length mismatch");
    assert_eq!(a.len(), out.len(), "hadamard: output length mismatch");
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = x * y;
    }
}

/// Index of the largest value in each row; the first index wins ties.
pub fn argmax_rows(data: &[f32], rows: usize, cols: usize) -> Vec<usize> {
    data.chunks_exact(cols)
        .take(rows)
        .map(|row| {
            let mut best = 0usize;
            let mut best_value = row[0];
            for (i, &value) in row.iter().enumerate().skip(1) {
                if value > best_value {
                    best_value = value;
                    best = i;
                }
            }
            best
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemm_basic_multiplication() {
        // 2x3 * 3x2 = 2x2
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut c = vec![0.0; 4];

        sgemm_wrapper(2, 2, 3, &a, 3, &b, 2, &mut c, 2, false, false, 1.0, 0.0);

        assert_eq!(c, vec![22.0, 28.0, 49.0, 64.0]);
    }

    #[test]
    fn test_gemm_transpose_a() {
        // A stored 3x2, op(A) = A^T is 2x3
        let a = vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0];
        let b = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut c = vec![0.0; 4];

        sgemm_wrapper(2, 2, 3, &a, 2, &b, 2, &mut c, 2, true, false, 1.0, 0.0);

        assert_eq!(c, vec![22.0, 28.0, 49.0, 64.0]);
    }

    #[test]
    fn test_gemm_transpose_b() {
        // B stored 2x3, op(B) = B^T is 3x2
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0];
        let mut c = vec![0.0; 4];

        sgemm_wrapper(2, 2, 3, &a, 3, &b, 3, &mut c, 2, false, true, 1.0, 0.0);

        assert_eq!(c, vec![22.0, 28.0, 49.0, 64.0]);
    }

    #[test]
    fn test_gemm_beta_accumulates() {
        let a = vec![1.0, 0.0, 0.0, 1.0];
        let b = vec![1.0, 1.0, 1.0, 1.0];
        let mut c = vec![1.0; 4];

        sgemm_wrapper(2, 2, 2, &a, 2, &b, 2, &mut c, 2, false, false, 1.0, 1.0);

        assert_eq!(c, vec![2.0; 4]);
    }

    #[test]
    #[should_panic(expected = "sgemm: A buffer too small")]
    fn test_gemm_rejects_short_buffer() {
        let a = vec![1.0; 3];
        let b = vec![1.0; 4];
        let mut c = vec![0.0; 4];
        sgemm_wrapper(2, 2, 2, &a, 2, &b, 2, &mut c, 2, false, false, 1.0, 0.0);
    }

    #[test]
    fn test_sum_rows_and_add_bias() {
        let mut data = vec![1.0, 2.0, 3.0, 4.0];
        add_bias(&mut data, 2, 2, &[10.0, 20.0]);
        assert_eq!(data, vec![11.0, 22.0, 13.0, 24.0]);

        let mut out = vec![0.0; 2];
        sum_rows(&data, 2, 2, &mut out);
        assert_eq!(out, vec![24.0, 46.0]);
    }

    #[test]
    fn test_argmax_first_index_wins_ties() {
        let data = vec![0.5, 0.5, 0.2, 0.8];
        assert_eq!(argmax_rows(&data, 2, 2), vec![0, 1]);
    }
}
