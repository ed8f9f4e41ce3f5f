//! Alignment of variable-length heart-rate series into a rectangular
//! matrix.
//!
//! Class length is operator-controlled and short classes are rare, so the
//! policy is to truncate everything to a low quantile of the length
//! distribution and drop the few classes shorter than that, keeping
//! roughly 90% of the history comparable minute by minute. Padding is
//! never used: it would corrupt the per-minute mean.

use crate::error::{ReportError, ReportResult};
use crate::records::WorkoutRecord;

pub const DEFAULT_CUTOFF_PERCENTILE: f64 = 0.1;

/// Rectangular table of BPM samples: rows are qualifying classes in input
/// order, columns are minutes into class. Every row has exactly `cutoff`
/// columns.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedMatrix {
    pub rows: Vec<Vec<u32>>,
    pub cutoff: usize,
    /// Classes with a decodable series that were shorter than the cutoff.
    pub dropped: usize,
}

/// Linear-interpolation quantile over a sorted slice, the default method of
/// the usual statistical packages. `q` must be in `[0, 1]`.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    debug_assert!((0.0..=1.0).contains(&q));
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Align all records with a decodable heart-rate series to a common length.
///
/// The cutoff is `floor(quantile(lengths, cutoff_percentile))`, derived
/// once from the full unfiltered length distribution. Series at least that
/// long are truncated to their first `cutoff` minutes; shorter ones are
/// dropped. A degenerate cutoff of 0 or 1 still produces a matrix;
/// statistics over it are the caller's concern.
pub fn align(records: &[WorkoutRecord], cutoff_percentile: f64) -> ReportResult<AlignedMatrix> {
    let series: Vec<&[u32]> = records
        .iter()
        .filter_map(|r| r.hr_series.as_deref())
        .collect();
    if series.is_empty() {
        return Err(ReportError::InsufficientData(
            "no classes with a decodable heart-rate series".into(),
        ));
    }

    let mut lengths: Vec<f64> = series.iter().map(|s| s.len() as f64).collect();
    lengths.sort_by(|a, b| a.partial_cmp(b).expect("lengths are finite"));
    let cutoff = quantile(&lengths, cutoff_percentile).floor() as usize;

    let mut rows = Vec::with_capacity(series.len());
    let mut dropped = 0usize;
    for s in series {
        if s.len() < cutoff {
            dropped += 1;
            continue;
        }
        rows.push(s[..cutoff].to_vec());
    }
    tracing::debug!(cutoff, kept = rows.len(), dropped, "aligned heart-rate matrix");
    Ok(AlignedMatrix {
        rows,
        cutoff,
        dropped,
    })
}
