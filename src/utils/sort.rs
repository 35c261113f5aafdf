/// Sort a SoA pair (inds/vals) by index, ascending and stable.
/// vals are reordered together with their index.
pub fn sort_soa_by_index<N: Copy>(inds: &mut [u32], vals: &mut [N]) {
    assert_eq!(inds.len(), vals.len());
    let n = inds.len();
    if n <= 1 {
        return;
    }
    // Small sizes: insertion sort avoids the scratch permutation.
    if n <= 32 {
        insertion_sort_u32_soa(inds, vals);
        return;
    }
    if inds.windows(2).all(|w| w[0] <= w[1]) {
        return;
    }

    let mut perm: Vec<usize> = (0..n).collect();
    perm.sort_by_key(|&i| inds[i]);
    let sorted_inds: Vec<u32> = perm.iter().map(|&i| inds[i]).collect();
    let sorted_vals: Vec<N> = perm.iter().map(|&i| vals[i]).collect();
    inds.copy_from_slice(&sorted_inds);
    vals.copy_from_slice(&sorted_vals);
}

/// Tiny insertion sort for small n (SoA).
#[inline(always)]
fn insertion_sort_u32_soa<N: Copy>(inds: &mut [u32], vals: &mut [N]) {
    let n = inds.len();
    for i in 1..n {
        let mut j = i;
        while j > 0 && inds[j] < inds[j - 1] {
            inds.swap(j, j - 1);
            vals.swap(j, j - 1);
            j -= 1;
        }
    }
}
