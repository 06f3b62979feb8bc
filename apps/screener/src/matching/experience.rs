use tracing::debug;

use crate::extraction::clean::first_number;

/// Graduated experience score: full marks at or above the JD minimum,
/// proportional below it.
pub fn experience_match(required_years: Option<&str>, cv_years: Option<f64>) -> f64 {
    let cv_years = cv_years.filter(|years| years.is_finite() && *years >= 0.0);

    let Some(min_years) = required_years.and_then(first_number) else {
        debug!("  JD experience not specified");
        return match cv_years {
            Some(years) if years > 0.0 => 0.5,
            _ => 0.0,
        };
    };

    let Some(years) = cv_years else {
        debug!("  CV experience not available");
        return 0.0;
    };

    if years >= min_years {
        1.0
    } else {
        // min_years > years >= 0, so min_years is positive here
        (years / min_years).clamp(0.0, 1.0)
    }
}
