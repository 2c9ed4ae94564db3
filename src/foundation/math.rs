pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Piecewise-linear map of `input` through `(stops[i], values[i])` control points.
///
/// `stops` must be non-decreasing and the same length as `values`. Inputs before
/// the first stop or after the last one hold the boundary value. Coincident stops
/// are allowed; the value right of the shared stop wins.
pub(crate) fn interpolate(input: f64, stops: &[f64], values: &[f64]) -> f64 {
    debug_assert_eq!(stops.len(), values.len());
    let Some(&last) = values.last() else {
        return 0.0;
    };
    if input.is_nan() {
        return values[0];
    }

    let idx = stops.partition_point(|s| *s <= input);
    if idx == 0 {
        return values[0];
    }
    if idx >= stops.len() {
        return last;
    }

    // partition_point guarantees stops[idx - 1] <= input < stops[idx].
    let (a, b) = (idx - 1, idx);
    let t = (input - stops[a]) / (stops[b] - stops[a]);
    lerp(values[a], values[b], t)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
