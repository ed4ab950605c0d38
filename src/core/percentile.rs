/// Index of the representative outcome for percentile `p` over `len` sorted
/// trials: `floor(len * p)`, clamped so a short or single-element
/// distribution can never index out of bounds.
pub(crate) fn representative_index(len: usize, p: f64) -> usize {
    if len == 0 {
        return 0;
    }
    let idx = ((len as f64) * p).floor() as usize;
    idx.min(len - 1)
}

/// Linear-interpolating percentile over unsorted values. Empty input yields
/// 0.0 rather than an error; degenerate cases resolve to defined outputs.
pub(crate) fn percentile(values: &mut [f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(|a, b| a.total_cmp(b));

    let n = values.len();
    if n == 1 {
        return values[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        values[lower]
    } else {
        let w = rank - lower as f64;
        values[lower] * (1.0 - w) + values[upper] * w
    }
}
