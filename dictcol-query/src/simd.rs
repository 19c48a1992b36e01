//! Wide id-scan kernels (scalar + SIMD runtime dispatch).
//!
//! The unit of work is a broadcast-compare over eight 32-bit ids per step.
//! Design goals follow the rest of the workspace:
//! - **No user configuration**: runtime dispatch uses SIMD when available.
//! - **Portable**: scalar fallback on all platforms with identical
//!   semantics, including ascending position order.
//! - **Safe call sites**: SIMD functions are `unsafe` + guarded by feature
//!   detection; positions past the last full lane are swept scalar.

/// Append every position `i` with `data[i] == target` to `out`, ascending.
#[inline]
pub fn scan_eq_positions(data: &[u32], target: u32, out: &mut Vec<usize>) {
    #[cfg(target_arch = "x86_64")]
    {
        if std::arch::is_x86_feature_detected!("avx2") {
            // SAFETY: guarded by runtime feature detection.
            unsafe { scan_eq_avx2(data, target, out) };
            return;
        }
        scan_eq_scalar(data, target, out);
    }

    #[cfg(target_arch = "aarch64")]
    {
        // NEON/ASIMD is baseline on aarch64.
        unsafe { scan_eq_neon(data, target, out) };
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    scan_eq_scalar(data, target, out);
}

/// Scalar kernel. Shared by the scalar search variants and the SIMD tail.
#[inline]
pub fn scan_eq_scalar(data: &[u32], target: u32, out: &mut Vec<usize>) {
    for (i, &id) in data.iter().enumerate() {
        if id == target {
            out.push(i);
        }
    }
}

// =============================================================================
// x86_64 SIMD (AVX2)
// =============================================================================

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn scan_eq_avx2(data: &[u32], target: u32, out: &mut Vec<usize>) {
    use std::arch::x86_64::*;

    let target_vec = _mm256_set1_epi32(target as i32);
    let n = data.len();
    let mut i = 0usize;
    while i + 8 <= n {
        let lane = _mm256_loadu_si256(data.as_ptr().add(i) as *const __m256i);
        let cmp = _mm256_cmpeq_epi32(lane, target_vec);
        let mut mask = _mm256_movemask_ps(_mm256_castsi256_ps(cmp)) as u32;
        // Walk set bits low-to-high so positions stay ascending.
        while mask != 0 {
            let bit = mask.trailing_zeros() as usize;
            out.push(i + bit);
            mask &= mask - 1;
        }
        i += 8;
    }

    // Tail
    while i < n {
        if *data.get_unchecked(i) == target {
            out.push(i);
        }
        i += 1;
    }
}

// =============================================================================
// aarch64 SIMD (NEON)
// =============================================================================

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn scan_eq_neon(data: &[u32], target: u32, out: &mut Vec<usize>) {
    use std::arch::aarch64::*;

    let target_vec = vdupq_n_u32(target);
    let n = data.len();
    let mut i = 0usize;
    while i + 8 <= n {
        let lo = vld1q_u32(data.as_ptr().add(i));
        let hi = vld1q_u32(data.as_ptr().add(i + 4));
        let cmp = vorrq_u32(vceqq_u32(lo, target_vec), vceqq_u32(hi, target_vec));
        // Most steps have no hit; only resolve lanes when one did.
        if vmaxvq_u32(cmp) != 0 {
            for k in 0..8 {
                if *data.get_unchecked(i + k) == target {
                    out.push(i + k);
                }
            }
        }
        i += 8;
    }

    // Tail
    while i < n {
        if *data.get_unchecked(i) == target {
            out.push(i);
        }
        i += 1;
    }
}

// =============================================================================
// Tests (dispatch matches scalar)
// =============================================================================
