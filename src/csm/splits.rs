/// Blend weight between uniform (0) and logarithmic (1) split placement.
pub const DEFAULT_SPLIT_LAMBDA: f32 = 0.5;

/// Far distance of every cascade along the view axis, using [`DEFAULT_SPLIT_LAMBDA`].
///
/// Returns `cascade_count` values; the last one is exactly `far`. The near
/// plane itself is not included.
pub fn compute_splits(near: f32, far: f32, cascade_count: usize) -> Vec<f32> {
    compute_splits_with_lambda(near, far, cascade_count, DEFAULT_SPLIT_LAMBDA)
}

/// Practical split scheme: lerp from uniform to logarithmic spacing by `lambda`.
pub fn compute_splits_with_lambda(
    near: f32,
    far: f32,
    cascade_count: usize,
    lambda: f32,
) -> Vec<f32> {
    let count = if cascade_count == 0 {
        tracing::warn!("cascade count of 0 requested, using a single cascade");
        1
    } else {
        cascade_count
    };

    if far.is_nan() || near.is_nan() || far <= near {
        tracing::warn!(near, far, "far plane is not beyond the near plane, splits collapse to far");
        return vec![far; count];
    }

    let mut lambda = lambda.clamp(0.0, 1.0);
    if near <= 0.0 {
        tracing::warn!(near, "logarithmic splits need a positive near plane, using uniform splits");
        lambda = 0.0;
    }

    let mut splits: Vec<f32> = (1..=count)
        .map(|i| {
            let f = i as f32 / count as f32;
            let uniform = near + (far - near) * f;
            if lambda == 0.0 {
                return uniform;
            }
            let log = near * (far / near).powf(f);
            uniform + (log - uniform) * lambda
        })
        .collect();

    if let Some(last) = splits.last_mut() {
        *last = far;
    }
    splits
}

/// Index of the cascade covering view depth `depth`, clamped to the last cascade.
///
/// Mirrors the selection the lighting shader does with the same split list.
pub fn cascade_for_depth(splits: &[f32], depth: f32) -> usize {
    splits
        .iter()
        .position(|&split| depth < split)
        .unwrap_or_else(|| splits.len().saturating_sub(1))
}
