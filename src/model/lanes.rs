use crate::error::ConvertError;

/// Width of the MGXC playfield in column units.
pub const FIELD_WIDTH: u8 = 16;

/// Width of the osu!mania playfield that hit object x positions live in.
pub const SOURCE_WIDTH: i64 = 512;

/// A column span on the MGXC playfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lane {
    pub offset: u8,
    pub width: u8,
}

const fn lane(offset: u8, width: u8) -> Lane {
    Lane { offset, width }
}

// -----------------------------------------------------------------------------
// Fixed layouts for 1K .. 8K, indexed by `key_count - 1`.
//
// Every layout tiles all 16 columns. Odd key counts give the center lane the
// leftover width so the field stays symmetric.
// -----------------------------------------------------------------------------

pub const LAYOUTS: [&[Lane]; 8] = [
    &[lane(0, 16)],
    &[lane(0, 8), lane(8, 8)],
    &[lane(0, 4), lane(4, 8), lane(12, 4)],
    &[lane(0, 4), lane(4, 4), lane(8, 4), lane(12, 4)],
    &[lane(0, 3), lane(3, 3), lane(6, 4), lane(10, 3), lane(13, 3)],
    &[
        lane(0, 3),
        lane(3, 2),
        lane(5, 3),
        lane(8, 3),
        lane(11, 2),
        lane(13, 3),
    ],
    &[
        lane(0, 2),
        lane(2, 2),
        lane(4, 2),
        lane(6, 4),
        lane(10, 2),
        lane(12, 2),
        lane(14, 2),
    ],
    &[
        lane(0, 2),
        lane(2, 2),
        lane(4, 2),
        lane(6, 2),
        lane(8, 2),
        lane(10, 2),
        lane(12, 2),
        lane(14, 2),
    ],
];

/// Return the full layout for the given key count.
pub fn layout(key_count: u8) -> Result<&'static [Lane], ConvertError> {
    match key_count {
        1..=8 => Ok(LAYOUTS[key_count as usize - 1]),
        other => Err(ConvertError::UnsupportedKeyCount(other)),
    }
}

/// Return the MGXC column span for a source lane, failing on a lane index
/// the key count doesn't have.
///
/// Example:
/// ```ignore
/// let lane = resolve_lane(5, 2)?;
/// assert_eq!((lane.offset, lane.width), (6, 4));
/// ```
pub fn resolve_lane(key_count: u8, index: usize) -> Result<Lane, ConvertError> {
    layout(key_count)?
        .get(index)
        .copied()
        .ok_or(ConvertError::LaneOutOfRange { key_count, index })
}

/// Map an x position onto a source lane index, `floor(x * k / 512)`.
/// Positions outside the playfield are clamped onto the outermost lanes.
pub fn source_lane(x: i32, key_count: u8) -> usize {
    if key_count == 0 {
        return 0;
    }

    let x = (x as i64).clamp(0, SOURCE_WIDTH - 1);
    (x * key_count as i64 / SOURCE_WIDTH) as usize
}
