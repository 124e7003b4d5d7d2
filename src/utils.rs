/// Index of the first maximum; ties go to the lowest index.
pub fn argmax<'a>(values: impl IntoIterator<Item = &'a f64>) -> usize {
    let mut iter = values.into_iter().enumerate();
    let (mut result, mut max) = match iter.next() {
        Some((i, v)) => (i, v),
        None => return 0,
    };
    for (i, v) in iter {
        if v > max {
            max = v;
            result = i;
        }
    }
    result
}

pub fn max<'a>(values: impl IntoIterator<Item = &'a f64>) -> f64 {
    values
        .into_iter()
        .fold(f64::NEG_INFINITY, |acc, v| acc.max(*v))
}

pub fn moving_average(window: usize, vector: &[f64]) -> Vec<f64> {
    let window = window.max(1);
    vector
        .chunks(window)
        .map(|slice| slice.iter().sum::<f64>() / slice.len() as f64)
        .collect()
}
