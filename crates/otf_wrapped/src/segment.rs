//! Segmentation of aligned classes by inferred starting station.
//!
//! OTF classes split the room between treadmills and rowers. There is no
//! ground-truth label for where a member started, so this is a modeling
//! assumption, not fact: peak heart rate is assumed to happen during the
//! tread block, so a peak in the first half of class means a tread start.
//! The classifier is a named, overridable function for exactly that
//! reason.

use crate::align::AlignedMatrix;

/// Inferred starting equipment for one class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Station {
    Tread,
    Rower,
}

/// Disjoint row subsets of an [`AlignedMatrix`]. Every qualifying row lands
/// in exactly one of the two.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Segments {
    pub tread_start: Vec<Vec<u32>>,
    pub row_start: Vec<Vec<u32>>,
}

/// Index of the row maximum, ties broken by first occurrence. Heart-rate
/// data plateaus routinely, so the tie-break has to be explicit.
pub fn argmax(row: &[u32]) -> usize {
    let mut best = 0usize;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}

/// The default start-of-class heuristic: peak BPM before the midpoint
/// column means the member started on the tread.
pub fn peak_before_midpoint(row: &[u32], midpoint: usize) -> Station {
    if argmax(row) < midpoint {
        Station::Tread
    } else {
        Station::Rower
    }
}

/// Partition the matrix with the default heuristic.
pub fn segment(matrix: &AlignedMatrix) -> Segments {
    segment_by(matrix, peak_before_midpoint)
}

/// Partition the matrix with a caller-supplied classifier. The midpoint is
/// `cutoff / 2` (floor).
pub fn segment_by<F>(matrix: &AlignedMatrix, classify: F) -> Segments
where
    F: Fn(&[u32], usize) -> Station,
{
    let midpoint = matrix.cutoff / 2;
    let mut segments = Segments::default();
    for row in &matrix.rows {
        match classify(row, midpoint) {
            Station::Tread => segments.tread_start.push(row.clone()),
            Station::Rower => segments.row_start.push(row.clone()),
        }
    }
    segments
}
