/// A closed one-dimensional integer domain `[min, max]`.
///
/// No ordering is enforced: an interval with `max < min` is valid and maps
/// inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Domain {
    pub min: i64,
    pub max: i64,
}

impl Domain {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// The `(low, high)` bounds regardless of orientation
    fn ordered(&self) -> (i64, i64) {
        if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }
}

/// Default target domain for an 8-bit greyscale image
pub const TARGET_PIXEL_DOMAIN: Domain = Domain::new(0, 255);

/// Map `value` from `source` into `target`.
///
/// The value is clamped into `source` first, then scaled linearly with
/// truncating integer division. A degenerate source (`min == max`) has no
/// range to scale over and maps everything to `target.min`.
pub fn map_value(value: i64, source: Domain, target: Domain) -> i64 {
    let (low, high) = source.ordered();
    let value = value.clamp(low, high);

    let target_range = i128::from(target.max) - i128::from(target.min);
    let source_range = i128::from(source.max) - i128::from(source.min);
    if source_range == 0 {
        return target.min;
    }

    let offset = target_range
        .checked_mul(i128::from(value) - i128::from(source.min))
        .map(|scaled| scaled / source_range);

    match offset.and_then(|o| o.checked_add(i128::from(target.min))) {
        Some(mapped) => i64::try_from(mapped).unwrap_or(if mapped < 0 {
            i64::MIN
        } else {
            i64::MAX
        }),
        // only reachable with ranges near the i64 limits
        None if target_range < 0 => i64::MIN,
        None => i64::MAX,
    }
}
