/// argmax returns the index of the maximum value in the array x. The first index wins on ties.
pub fn argmax<T: std::cmp::PartialOrd + std::marker::Copy>(x: &[T]) -> usize {
    let mut idx_max = 0;
    let mut val_max = x[0];

    for (i, &val) in x.iter().enumerate().skip(1) {
        if val > val_max {
            val_max = val;
            idx_max = i;
        }
    }

    idx_max
}

#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that would sort an array of floats. The sort is stable, i.e. equal
/// values keep their original index order, and NaN values are ordered by `f64::total_cmp`.
pub fn argsort(x: &[f64], order: SortOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..x.len()).collect();
    match order {
        SortOrder::Ascending => indices.sort_by(|&a, &b| x[a].total_cmp(&x[b])),
        SortOrder::Descending => indices.sort_by(|&a, &b| x[b].total_cmp(&x[a])),
    }
    indices
}

/// lin_interp returns the linearly interpolated value at x for given discrete data points xp, fp.
/// xp must be increasing. Inspired by numpy.interp.
pub fn lin_interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    if xp.len() != fp.len() {
        panic!("Number of items in xp and fp must be equal!")
    }

    if x <= xp[0] {
        return fp[0];
    }

    for i in 1..xp.len() {
        if x <= xp[i] {
            return fp[i - 1] + (x - xp[i - 1]) * (fp[i] - fp[i - 1]) / (xp[i] - xp[i - 1]);
        }
    }

    fp[fp.len() - 1]
}

/// clamp_pct limits a percentage value to [0.0, 100.0].
pub fn clamp_pct(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argsort_is_stable_for_ties() {
        let x = [3.0, 1.0, 3.0, 0.5];
        assert_eq!(argsort(&x, SortOrder::Ascending), vec![3, 1, 0, 2]);
        assert_eq!(argsort(&x, SortOrder::Descending), vec![0, 2, 1, 3]);
    }

    #[test]
    fn argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[1, 7, 7, 2]), 1);
    }

    #[test]
    fn lin_interp_clamps_outside_support() {
        let xp = [0.0, 10.0];
        let fp = [1.0, 3.0];
        assert_eq!(lin_interp(-5.0, &xp, &fp), 1.0);
        assert_eq!(lin_interp(5.0, &xp, &fp), 2.0);
        assert_eq!(lin_interp(15.0, &xp, &fp), 3.0);
    }

    #[test]
    fn clamp_pct_limits_range() {
        assert_eq!(clamp_pct(-3.0), 0.0);
        assert_eq!(clamp_pct(42.0), 42.0);
        assert_eq!(clamp_pct(120.0), 100.0);
        assert_eq!(clamp_pct(f64::NAN), 0.0);
    }
}
