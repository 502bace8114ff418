use crate::utils::math;

/// Weights of one pool snapshot together with their aggregates.
///
/// A pool is never changed after it is built: membership changes build
/// a new one.
#[derive(Debug)]
pub struct Pool {
    weights: Vec<u32>,
    max_weight: u32,
    gcd_weight: u32,
}

impl Pool {
    pub fn new(weights: Vec<u32>) -> Self {
        let max_weight = math::max_num(weights.iter().copied());
        let gcd_weight = math::gcd_nums(weights.iter().copied());

        Self {
            weights,
            max_weight,
            gcd_weight,
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weight(&self, index: usize) -> u32 {
        self.weights[index]
    }

    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    pub fn max_weight(&self) -> u32 {
        self.max_weight
    }

    pub fn gcd_weight(&self) -> u32 {
        self.gcd_weight
    }

    pub fn total_weight(&self) -> u64 {
        self.weights.iter().map(|&w| u64::from(w)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregates() {
        let pool = Pool::new(vec![6, 4, 2]);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.max_weight(), 6);
        assert_eq!(pool.gcd_weight(), 2);
        assert_eq!(pool.total_weight(), 12);
    }

    #[test]
    fn test_empty() {
        let pool = Pool::new(Vec::new());
        assert!(pool.is_empty());
        assert_eq!(pool.max_weight(), 0);
        assert_eq!(pool.gcd_weight(), 0);
    }

    #[test]
    fn test_single() {
        let pool = Pool::new(vec![5]);
        assert_eq!(pool.max_weight(), 5);
        assert_eq!(pool.gcd_weight(), 5);
    }

    #[test]
    fn test_zero_weights() {
        let pool = Pool::new(vec![0, 0]);
        assert_eq!(pool.max_weight(), 0);
        assert_eq!(pool.gcd_weight(), 0);

        let pool = Pool::new(vec![0, 9, 6]);
        assert_eq!(pool.max_weight(), 9);
        assert_eq!(pool.gcd_weight(), 3);
    }
}
