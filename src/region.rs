//! Rectangular detector regions of interest.
//!
//! Every beamline records its regions differently (corner plus size, two
//! corners, or a loosely-quoted JSON blob). [`Region`] is the one normalized
//! form they all decode into.

use std::fmt;
use std::ops::Range;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::NxError;

/// A rectangle in detector pixel space.
///
/// The constructor guarantees `x_start <= x_end` and `y_start <= y_end`.
/// Fields are private so the ordering cannot be broken after construction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Region {
    x_start: i64,
    x_end: i64,
    y_start: i64,
    y_end: i64,
}

impl Region {
    /// Creates a region from explicit bounds, swapping reversed endpoints.
    pub fn new(x_start: i64, x_end: i64, y_start: i64, y_end: i64) -> Self {
        let (x_start, x_end) = if x_end < x_start {
            (x_end, x_start)
        } else {
            (x_start, x_end)
        };
        let (y_start, y_end) = if y_end < y_start {
            (y_end, y_start)
        } else {
            (y_start, y_end)
        };
        Self {
            x_start,
            x_end,
            y_start,
            y_end,
        }
    }

    /// Creates a region from floating point bounds, truncating toward zero.
    ///
    /// Truncation is monotonic, so ordering before or after truncating gives
    /// the same result.
    pub fn from_f64(x_start: f64, x_end: f64, y_start: f64, y_end: f64) -> Self {
        Self::new(
            x_start as i64,
            x_end as i64,
            y_start as i64,
            y_end as i64,
        )
    }

    /// Creates a region from a corner and a size.
    ///
    /// Ends that would not fit in an `i64` saturate at the type's bounds.
    #[inline]
    pub fn from_xywh(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self::new(x, x.saturating_add(width), y, y.saturating_add(height))
    }

    /// Decodes a mapping with the keys `x`, `y`, `width` and `height`.
    ///
    /// Each value is coerced to an integer first (numbers are truncated,
    /// numeric strings are parsed). Extra keys such as `angle` are ignored.
    ///
    /// # Errors
    /// [`NxError::MissingKey`] when one of the four keys is absent and
    /// [`NxError::InvalidRegionValue`] when a value is not integer-like or
    /// a corner plus its size overflows `i64`.
    pub fn from_map(region_map: &Map<String, Value>) -> Result<Self, NxError> {
        let x = map_int(region_map, "x")?;
        let y = map_int(region_map, "y")?;
        let width = map_int(region_map, "width")?;
        let height = map_int(region_map, "height")?;
        let x_end = x
            .checked_add(width)
            .ok_or_else(|| overflow(region_map, "width"))?;
        let y_end = y
            .checked_add(height)
            .ok_or_else(|| overflow(region_map, "height"))?;
        Ok(Self::new(x, x_end, y, y_end))
    }

    #[inline]
    pub fn x_start(&self) -> i64 {
        self.x_start
    }

    #[inline]
    pub fn x_end(&self) -> i64 {
        self.x_end
    }

    #[inline]
    pub fn y_start(&self) -> i64 {
        self.y_start
    }

    #[inline]
    pub fn y_end(&self) -> i64 {
        self.y_end
    }

    /// Extent of the region along x.
    #[inline]
    pub fn x_length(&self) -> u64 {
        self.x_end.abs_diff(self.x_start)
    }

    /// Extent of the region along y.
    #[inline]
    pub fn y_length(&self) -> u64 {
        self.y_end.abs_diff(self.y_start)
    }

    /// Number of pixels covered, `x_length * y_length`.
    ///
    /// Widened to `u128` so any pair of `i64` bounds fits.
    #[inline]
    pub fn num_pixels(&self) -> u128 {
        u128::from(self.x_length()) * u128::from(self.y_length())
    }

    /// Returns slice bounds that select this region from a detector image.
    ///
    /// The upper bounds are treated as inclusive: a non-negative end becomes
    /// `end + 1`. A negative end is passed through untouched, so it keeps its
    /// count-from-the-back meaning. Downstream array slicing depends on
    /// exactly this asymmetry.
    pub fn slice_bounds(&self) -> SliceBounds {
        let x_stop = if self.x_end >= 0 {
            self.x_end.saturating_add(1)
        } else {
            self.x_end
        };
        let y_stop = if self.y_end >= 0 {
            self.y_end.saturating_add(1)
        } else {
            self.y_end
        };
        SliceBounds {
            x: self.x_start..x_stop,
            y: self.y_start..y_stop,
        }
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("x_start", &self.x_start)
            .field("x_end", &self.x_end)
            .field("y_start", &self.y_start)
            .field("y_end", &self.y_end)
            .finish()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x_start: {}, x_end: {}, y_start: {}, y_end: {}.",
            self.x_start, self.x_end, self.y_start, self.y_end
        )
    }
}

/// Signed slice bounds along both detector axes, as produced by
/// [`Region::slice_bounds`].
///
/// Negative values index from the back of the axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceBounds {
    pub x: Range<i64>,
    pub y: Range<i64>,
}

impl SliceBounds {
    /// Resolves the bounds against an image of shape `(x_len, y_len)`.
    ///
    /// Negative indices count from the back and everything is clamped to the
    /// axis length. An empty selection yields an empty range.
    pub fn resolve(&self, x_len: usize, y_len: usize) -> (Range<usize>, Range<usize>) {
        (
            resolve_axis(&self.x, x_len),
            resolve_axis(&self.y, y_len),
        )
    }
}

fn resolve_axis(range: &Range<i64>, len: usize) -> Range<usize> {
    let clamp = |idx: i64| -> usize {
        let len = len as i64;
        let idx = if idx < 0 { idx + len } else { idx };
        idx.clamp(0, len) as usize
    };
    let start = clamp(range.start);
    let end = clamp(range.end);
    start..end.max(start)
}

fn overflow(region_map: &Map<String, Value>, key: &'static str) -> NxError {
    NxError::InvalidRegionValue {
        key,
        value: region_map
            .get(key)
            .map(Value::to_string)
            .unwrap_or_default(),
    }
}

fn map_int(region_map: &Map<String, Value>, key: &'static str) -> Result<i64, NxError> {
    let value = region_map.get(key).ok_or(NxError::MissingKey(key))?;
    let invalid = || NxError::InvalidRegionValue {
        key,
        value: value.to_string(),
    };

    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v as i64))
            .ok_or_else(invalid),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
        Value::Bool(b) => Ok(i64::from(*b)),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn new_swaps_reversed_bounds() {
        let region = Region::new(8, 2, 9, 3);
        assert_eq!(region.x_start(), 2);
        assert_eq!(region.x_end(), 8);
        assert_eq!(region.y_start(), 3);
        assert_eq!(region.y_end(), 9);
    }

    #[test]
    fn from_f64_truncates() {
        let region = Region::from_f64(1.9, 5.2, -0.5, 3.99);
        assert_eq!(region, Region::new(1, 5, 0, 3));
    }

    #[test]
    fn geometry() {
        let region = Region::new(2, 8, 3, 9);
        assert_eq!(region.x_length(), 6);
        assert_eq!(region.y_length(), 6);
        assert_eq!(region.num_pixels(), 36);
    }

    #[test]
    fn from_map_adds_size_to_corner() {
        let map = as_map(json!({"x": 5, "y": 10, "width": 3, "height": 4}));
        let region = Region::from_map(&map).expect("decode");
        assert_eq!(region, Region::new(5, 8, 10, 14));
    }

    #[test]
    fn from_map_accepts_floats_and_numeric_strings() {
        let map = as_map(json!({"x": 5.7, "y": "10", "width": 3, "height": 4.2, "angle": 0}));
        let region = Region::from_map(&map).expect("decode");
        assert_eq!(region, Region::new(5, 8, 10, 14));
    }

    #[test]
    fn from_map_missing_key() {
        let map = as_map(json!({"x": 5, "y": 10, "width": 3}));
        match Region::from_map(&map) {
            Err(NxError::MissingKey(key)) => assert_eq!(key, "height"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn from_map_rejects_non_numeric() {
        let map = as_map(json!({"x": "left", "y": 10, "width": 3, "height": 4}));
        assert!(matches!(
            Region::from_map(&map),
            Err(NxError::InvalidRegionValue { key: "x", .. })
        ));
    }

    #[test]
    fn explicit_and_mapped_regions_compare_equal() {
        let map = as_map(json!({"x": 1, "y": 2, "width": 3, "height": 4}));
        assert_eq!(Region::from_map(&map).unwrap(), Region::new(4, 1, 6, 2));
    }

    #[test]
    fn from_map_rejects_ends_past_i64() {
        let map = as_map(json!({"x": i64::MAX, "y": 0, "width": 1, "height": 1}));
        match Region::from_map(&map) {
            Err(NxError::InvalidRegionValue { key, value }) => {
                assert_eq!(key, "width");
                assert_eq!(value, "1");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn extreme_bounds_do_not_overflow() {
        let region = Region::new(i64::MIN, i64::MAX, 0, 10_000_000_000);
        assert_eq!(region.x_length(), u64::MAX);
        assert_eq!(region.num_pixels(), u128::from(u64::MAX) * 10_000_000_000);

        let huge = Region::from_xywh(0, 0, 10_000_000_000, 10_000_000_000);
        assert_eq!(huge.num_pixels(), 100_000_000_000_000_000_000);

        let bounds = Region::new(0, i64::MAX, 0, 1).slice_bounds();
        assert_eq!(bounds.x, 0..i64::MAX);
        assert_eq!(Region::from_xywh(i64::MAX, 0, 5, 0).x_end(), i64::MAX);
    }

    #[test]
    fn slice_bounds_are_end_inclusive() {
        let bounds = Region::new(0, 4, 0, 4).slice_bounds();
        assert_eq!(bounds.x, 0..5);
        assert_eq!(bounds.y, 0..5);
    }

    #[test]
    fn slice_bounds_leave_negative_ends() {
        let bounds = Region::new(-6, -2, 1, 3).slice_bounds();
        assert_eq!(bounds.x, -6..-2);
        assert_eq!(bounds.y, 1..4);
    }

    #[test]
    fn resolve_counts_negative_indices_from_the_back() {
        let bounds = Region::new(-6, -2, 1, 3).slice_bounds();
        let (x, y) = bounds.resolve(10, 10);
        assert_eq!(x, 4..8);
        assert_eq!(y, 1..4);
    }

    #[test]
    fn resolve_clamps_to_shape() {
        let (x, y) = Region::new(5, 50, 0, 2).slice_bounds().resolve(20, 2);
        assert_eq!(x, 5..20);
        assert_eq!(y, 0..2);
    }

    #[test]
    fn display_lists_all_bounds() {
        assert_eq!(
            Region::new(1, 4, 2, 6).to_string(),
            "x_start: 1, x_end: 4, y_start: 2, y_end: 6."
        );
    }
}
