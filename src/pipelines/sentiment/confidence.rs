use crate::error::{PipelineError, Result};

/// Shown in place of a percentage when a row has no score.
pub const NOT_AVAILABLE: &str = "N/A";

/// Format a probability as a percentage with two decimals, e.g. `0.9345 -> "93.45%"`.
///
/// Scores outside `[0, 1]` are clamped. Non-finite scores format as `"0.00%"`;
/// use [`checked_score`] first if those should be rejected.
pub fn format_confidence(score: f32) -> String {
    let score = if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    };
    format!("{:.2}%", f64::from(score) * 100.0)
}

/// Apply the score policy shared by the single and batch paths.
///
/// Finite scores outside `[0, 1]` are clamped with a warning. NaN and
/// infinities are rejected with [`PipelineError::Format`].
pub fn checked_score(score: f32) -> Result<f32> {
    if !score.is_finite() {
        return Err(PipelineError::Format(format!(
            "Classifier returned non-finite score {score}"
        )));
    }
    if !(0.0..=1.0).contains(&score) {
        let clamped = score.clamp(0.0, 1.0);
        tracing::warn!(score, clamped, "classifier score outside [0, 1], clamping");
        return Ok(clamped);
    }
    Ok(score)
}
