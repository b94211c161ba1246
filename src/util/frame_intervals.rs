//! Frame interval algebra.
//!
//! Every element, element data pointer and the document itself record the
//! frames they span as a [`FrameIntervals`]: a sorted list of inclusive
//! `[frame_start, frame_end]` ranges with no overlaps and no touching
//! neighbours. An empty list means "static".

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;

use super::{Error, Result};

/// Frame number inside a sequence.
pub type FrameNum = i64;

/// A single inclusive range of frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameInterval {
    pub frame_start: FrameNum,
    pub frame_end: FrameNum,
}

impl FrameInterval {
    /// Create a range, failing if `start > end`.
    pub fn new(frame_start: FrameNum, frame_end: FrameNum) -> Result<Self> {
        if frame_start > frame_end {
            return Err(Error::range(format!("frame_start {frame_start} > frame_end {frame_end}")));
        }
        Ok(Self { frame_start, frame_end })
    }

    /// Range covering exactly one frame.
    pub const fn single(frame: FrameNum) -> Self {
        Self { frame_start: frame, frame_end: frame }
    }

    /// Number of frames in the range, saturating at `u64::MAX`.
    #[inline]
    pub fn len(&self) -> u64 {
        self.frame_end.abs_diff(self.frame_start).saturating_add(1)
    }

    #[inline]
    pub fn contains(&self, frame: FrameNum) -> bool {
        self.frame_start <= frame && frame <= self.frame_end
    }

    /// Overlapping sub-range, if any.
    pub fn overlap(&self, other: &Self) -> Option<Self> {
        let start = self.frame_start.max(other.frame_start);
        let end = self.frame_end.min(other.frame_end);
        (start <= end).then_some(Self { frame_start: start, frame_end: end })
    }
}

impl fmt::Display for FrameInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.frame_start, self.frame_end)
    }
}

/// Normalized set of frame ranges.
///
/// Uses SmallVec optimization: most elements span one or two ranges.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FrameIntervals {
    intervals: SmallVec<[FrameInterval; 2]>,
}

impl FrameIntervals {
    /// Empty (static) frame intervals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame intervals covering a single frame.
    pub fn from_frame(frame: FrameNum) -> Self {
        Self { intervals: smallvec::smallvec![FrameInterval::single(frame)] }
    }

    /// Frame intervals covering `[start, end]`.
    pub fn from_range(start: FrameNum, end: FrameNum) -> Result<Self> {
        Ok(Self { intervals: smallvec::smallvec![FrameInterval::new(start, end)?] })
    }

    /// Build from `(start, end)` pairs, sorting and fusing them.
    pub fn from_pairs(pairs: &[(FrameNum, FrameNum)]) -> Result<Self> {
        let intervals = pairs
            .iter()
            .map(|&(s, e)| FrameInterval::new(s, e))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::normalize(intervals))
    }

    /// Sort by start and fuse overlapping or adjacent ranges.
    pub fn normalize(intervals: impl IntoIterator<Item = FrameInterval>) -> Self {
        let mut sorted: SmallVec<[FrameInterval; 2]> = intervals.into_iter().collect();
        sorted.sort_by_key(|fi| (fi.frame_start, fi.frame_end));

        let mut fused: SmallVec<[FrameInterval; 2]> = SmallVec::with_capacity(sorted.len());
        for fi in sorted {
            match fused.last_mut() {
                Some(last) if fi.frame_start <= last.frame_end.saturating_add(1) => {
                    last.frame_end = last.frame_end.max(fi.frame_end);
                }
                _ => fused.push(fi),
            }
        }
        Self { intervals: fused }
    }

    /// Parse any of the accepted JSON shapes:
    ///
    /// - `null` or `[]` (static)
    /// - `5` (single frame)
    /// - `[0, 10]` (single range)
    /// - `[[0, 10], [26, 29]]`
    /// - `{"frame_start": 0, "frame_end": 10}`
    /// - `[{"frame_start": 0, "frame_end": 10}, ...]`
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Number(_) => Ok(Self::from_frame(as_frame(value)?)),
            Value::Object(_) => Ok(Self::normalize([interval_from_object(value)?])),
            Value::Array(items) if items.is_empty() => Ok(Self::new()),
            Value::Array(items) => {
                if items.iter().all(Value::is_number) {
                    if items.len() != 2 {
                        return Err(Error::range(format!("expected [start, end], got {value}")));
                    }
                    return Self::from_range(as_frame(&items[0])?, as_frame(&items[1])?);
                }
                let intervals = if items.iter().all(Value::is_array) {
                    items.iter().map(interval_from_pair).collect::<Result<Vec<_>>>()?
                } else if items.iter().all(Value::is_object) {
                    items.iter().map(interval_from_object).collect::<Result<Vec<_>>>()?
                } else {
                    return Err(Error::range(format!("mixed frame interval shapes: {value}")));
                };
                Ok(Self::normalize(intervals))
            }
            _ => Err(Error::range(format!("unsupported frame value: {value}"))),
        }
    }

    /// Canonical JSON form: array of `{frame_start, frame_end}` objects.
    pub fn to_value(&self) -> Value {
        Value::Array(
            self.intervals
                .iter()
                .map(|fi| serde_json::json!({ "frame_start": fi.frame_start, "frame_end": fi.frame_end }))
                .collect(),
        )
    }

    /// Check if static (no ranges).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Total number of frames covered, saturating at `u64::MAX`.
    pub fn len(&self) -> u64 {
        self.intervals.iter().fold(0u64, |acc, fi| acc.saturating_add(fi.len()))
    }

    /// Number of disjoint ranges.
    pub fn num_intervals(&self) -> usize {
        self.intervals.len()
    }

    /// The normalized ranges.
    pub fn intervals(&self) -> &[FrameInterval] {
        &self.intervals
    }

    /// Iterate over every frame number, in ascending order.
    pub fn frames(&self) -> impl Iterator<Item = FrameNum> + '_ {
        self.intervals.iter().flat_map(|fi| fi.frame_start..=fi.frame_end)
    }

    pub fn union(&self, other: &Self) -> Self {
        Self::normalize(self.intervals.iter().chain(other.intervals.iter()).copied())
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let overlaps = self
            .intervals
            .iter()
            .flat_map(|a| other.intervals.iter().filter_map(move |b| a.overlap(b)));
        Self::normalize(overlaps)
    }

    // Both sides are normalized, so set relations compare ranges directly.

    /// Check if every frame of `other` is in `self`.
    pub fn contains(&self, other: &Self) -> bool {
        self.intersection(other) == *other
    }

    /// Check if every frame of `self` is in `other`.
    pub fn is_contained_by(&self, other: &Self) -> bool {
        self.intersection(other) == *self
    }

    /// Check if both cover the same frames.
    pub fn equals(&self, other: &Self) -> bool {
        self == other
    }

    pub fn has_frame(&self, frame: FrameNum) -> bool {
        self.intervals.iter().any(|fi| fi.contains(frame))
    }

    /// Remove a single frame, splitting a range if the frame is interior.
    pub fn remove_frame(&mut self, frame: FrameNum) {
        let Some(pos) = self.intervals.iter().position(|fi| fi.contains(frame)) else {
            return;
        };
        let fi = self.intervals[pos];
        match (fi.frame_start == frame, fi.frame_end == frame) {
            (true, true) => {
                self.intervals.remove(pos);
            }
            (true, false) => self.intervals[pos].frame_start += 1,
            (false, true) => self.intervals[pos].frame_end -= 1,
            (false, false) => {
                self.intervals[pos].frame_end = frame - 1;
                self.intervals.insert(pos + 1, FrameInterval { frame_start: frame + 1, frame_end: fi.frame_end });
            }
        }
    }

    /// Copy of `self` without `frame`.
    pub fn without_frame(&self, frame: FrameNum) -> Self {
        let mut out = self.clone();
        out.remove_frame(frame);
        out
    }

    /// Smallest range enclosing every frame, if any.
    pub fn outer(&self) -> Option<FrameInterval> {
        let first = self.intervals.first()?;
        let last = self.intervals.last()?;
        Some(FrameInterval { frame_start: first.frame_start, frame_end: last.frame_end })
    }
}

impl From<FrameInterval> for FrameIntervals {
    fn from(fi: FrameInterval) -> Self {
        Self { intervals: smallvec::smallvec![fi] }
    }
}

impl From<FrameNum> for FrameIntervals {
    fn from(frame: FrameNum) -> Self {
        Self::from_frame(frame)
    }
}

impl FromIterator<FrameInterval> for FrameIntervals {
    fn from_iter<I: IntoIterator<Item = FrameInterval>>(iter: I) -> Self {
        Self::normalize(iter)
    }
}

impl fmt::Display for FrameIntervals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, fi) in self.intervals.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{fi}")?;
        }
        f.write_str("]")
    }
}

impl Serialize for FrameIntervals {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.intervals.as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FrameIntervals {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

fn as_frame(value: &Value) -> Result<FrameNum> {
    value
        .as_i64()
        .ok_or_else(|| Error::range(format!("frame number must be an integer, got {value}")))
}

fn interval_from_pair(value: &Value) -> Result<FrameInterval> {
    match value.as_array().map(Vec::as_slice) {
        Some([start, end]) => FrameInterval::new(as_frame(start)?, as_frame(end)?),
        _ => Err(Error::range(format!("expected [start, end], got {value}"))),
    }
}

fn interval_from_object(value: &Value) -> Result<FrameInterval> {
    match (value.get("frame_start"), value.get("frame_end")) {
        (Some(start), Some(end)) => FrameInterval::new(as_frame(start)?, as_frame(end)?),
        _ => Err(Error::range(format!("expected {{frame_start, frame_end}}, got {value}"))),
    }
}
