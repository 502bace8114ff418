use std::mem;

pub fn gcd(mut a: u32, mut b: u32) -> u32 {
    if a < b {
        mem::swap(&mut a, &mut b);
    }

    while b > 0 {
        a %= b;
        mem::swap(&mut a, &mut b);
    }

    a
}

/// Greatest common divisor of all weights.
///
/// Folds from 0, so an empty set gives 0, a single weight gives itself
/// and zero weights don't affect the result for the positive ones.
pub fn gcd_nums(iter: impl IntoIterator<Item = u32>) -> u32 {
    iter.into_iter().fold(0, gcd)
}

pub fn max_num(iter: impl IntoIterator<Item = u32>) -> u32 {
    iter.into_iter().max().unwrap_or(0)
}
