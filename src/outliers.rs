use crate::course::Course;
use serde::Serialize;
use tracing::debug;

pub const DEFAULT_THRESHOLD_STDDEV: f64 = 2.0;

/// Fewer recorded scores than this leaves the sample stdev undefined.
const MIN_SAMPLE_SIZE: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outlier {
    pub student_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStats {
    pub count: usize,
    pub mean: f64,
    pub stdev: f64,
}

/// Mean and N-1 standard deviation, or None below two values.
pub fn sample_stats(values: &[f64]) -> Option<SampleStats> {
    if values.len() < MIN_SAMPLE_SIZE {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some(SampleStats {
        count: values.len(),
        mean,
        stdev: (sum_sq / (n - 1.0)).sqrt(),
    })
}

/// Students whose score on `assignment_name` is more than
/// `threshold_stddev` sample deviations from the mean, in enrollment order.
///
/// Students with no recorded score are not part of the sample. A zero stdev
/// flags nobody.
pub fn detect_outliers(
    course: &Course,
    assignment_name: &str,
    threshold_stddev: f64,
) -> Vec<Outlier> {
    let sample: Vec<(&str, f64)> = course
        .students()
        .iter()
        .filter_map(|s| s.score(assignment_name).map(|v| (s.id.as_str(), v)))
        .collect();
    let values: Vec<f64> = sample.iter().map(|(_, v)| *v).collect();

    let Some(stats) = sample_stats(&values) else {
        return Vec::new();
    };
    debug!(
        assignment = assignment_name,
        sample = stats.count,
        mean = stats.mean,
        stdev = stats.stdev,
        "outlier sample"
    );
    if stats.stdev == 0.0 {
        return Vec::new();
    }

    let limit = threshold_stddev * stats.stdev;
    sample
        .into_iter()
        .filter(|(_, v)| (v - stats.mean).abs() > limit)
        .map(|(id, v)| Outlier {
            student_id: id.to_string(),
            score: v,
        })
        .collect()
}
