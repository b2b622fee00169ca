use crate::course::Course;
use serde::Serialize;

/// Divisor substituted when the catalog weights sum to zero.
///
/// With an all-zero catalog every `weight / divisor` is 0, so every total is 0.
/// This is not a fallback to an unweighted average.
pub const ZERO_TOTAL_WEIGHT_DIVISOR: f64 = 1.0;

/// Percentage credited for an assignment whose max score is 0.
pub const ZERO_MAX_SCORE_PERCENT: f64 = 0.0;

/// Rounds to 2 decimals against the exact binary value, ties to even.
///
/// `x * 100` can land on a `.5` that `x` itself is not; the residual of the
/// multiply decides those.
pub fn round_off_2_decimals(x: f64) -> f64 {
    let scaled = x * 100.0;
    let floor = scaled.floor();
    if scaled - floor != 0.5 {
        return scaled.round() / 100.0;
    }
    let residual = x.mul_add(100.0, -scaled);
    let rounded = if residual > 0.0 {
        floor + 1.0
    } else if residual < 0.0 || floor % 2.0 == 0.0 {
        floor
    } else {
        floor + 1.0
    };
    rounded / 100.0
}

pub fn weight_divisor(total_weight: f64) -> f64 {
    if total_weight == 0.0 {
        ZERO_TOTAL_WEIGHT_DIVISOR
    } else {
        total_weight
    }
}

/// Raw score as a percentage of the assignment's current max score.
pub fn percent_of_max(raw: f64, max_score: f64) -> f64 {
    if max_score == 0.0 {
        ZERO_MAX_SCORE_PERCENT
    } else {
        (raw / max_score) * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    /// Inclusive lower bounds 90/80/70/60 on the rounded total.
    pub fn from_total(total: f64) -> Self {
        match total {
            t if t >= 90.0 => LetterGrade::A,
            t if t >= 80.0 => LetterGrade::B,
            t if t >= 70.0 => LetterGrade::C,
            t if t >= 60.0 => LetterGrade::D,
            _ => LetterGrade::F,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedTotal {
    pub student_id: String,
    pub weighted_total: f64,
}

impl WeightedTotal {
    pub fn letter(&self) -> LetterGrade {
        LetterGrade::from_total(self.weighted_total)
    }
}

/// One 0-100 total per enrolled student, in enrollment order.
///
/// Always computed from the current catalog; nothing is cached between calls.
/// A missing score counts as 0 rather than being left out.
pub fn calculate_weighted_scores(course: &Course) -> Vec<WeightedTotal> {
    let total_weight: f64 = course.catalog().iter().map(|a| a.weight).sum();
    let divisor = weight_divisor(total_weight);

    course
        .students()
        .iter()
        .map(|s| {
            let mut total = 0.0_f64;
            for a in course.catalog().iter() {
                let raw = s.score(&a.name).unwrap_or(0.0);
                total += percent_of_max(raw, a.max_score) * (a.weight / divisor);
            }
            WeightedTotal {
                student_id: s.id.clone(),
                weighted_total: round_off_2_decimals(total),
            }
        })
        .collect()
}
