use reco_core::errors::{ErrorInfo, RecoError};

fn normalization_error(code: &str, message: &str, mass: f64) -> RecoError {
    RecoError::Normalization(
        ErrorInfo::new(code, message)
            .with_context("surviving_mass", mass)
            .with_hint("the upstream scores put no probability on any class allowed for this shape"),
    )
}

/// Zeroes every entry outside `allowed` and rescales the rest to sum to one.
///
/// Allowed indices past the end of `scores` are ignored. A negative or NaN
/// allowed entry is rejected, as is a vector with no positive finite mass
/// left after masking.
pub fn mask_and_renormalize(scores: &[f64], allowed: &[usize]) -> Result<Vec<f64>, RecoError> {
    let mut masked = vec![0.0; scores.len()];
    for &idx in allowed {
        if let Some(&value) = scores.get(idx) {
            if value.is_nan() || value < 0.0 {
                return Err(RecoError::Normalization(
                    ErrorInfo::new("negative-score", "allowed score is negative or NaN")
                        .with_context("index", idx)
                        .with_context("score", value),
                ));
            }
            masked[idx] = value;
        }
    }
    let mass: f64 = masked.iter().sum();
    if !mass.is_finite() {
        return Err(normalization_error(
            "non-finite-mass",
            "masked scores do not sum to a finite value",
            mass,
        ));
    }
    if mass <= 0.0 {
        return Err(normalization_error(
            "zero-mass",
            "masked scores have no mass left to renormalize",
            mass,
        ));
    }
    for value in &mut masked {
        *value /= mass;
    }
    Ok(masked)
}

/// Momentum magnitude from kinetic energy and rest mass, `sqrt(E^2 - m^2)`
/// with `E = T + m`.
pub fn relativistic_momentum(kinetic_energy: f64, mass: f64) -> f64 {
    let total = kinetic_energy + mass;
    (total * total - mass * mass).sqrt()
}

/// Scales a 3-vector.
pub fn scale(vector: [f64; 3], factor: f64) -> [f64; 3] {
    [vector[0] * factor, vector[1] * factor, vector[2] * factor]
}
