use crate::error::ConvertError;
use serde::{Deserialize, Serialize};

/// One tempo/signature/velocity segment of the source chart.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimingPoint {
    /// Absolute start of the segment, in milliseconds.
    pub offset: f64,
    /// Milliseconds per beat. Negative values mark a velocity-only point.
    pub beat_length: f64,
    /// Beats per section.
    pub time_signature: u32,
    /// Scroll speed multiplier.
    pub velocity: f64,
    /// Only present on tempo-defining points.
    pub bpm: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HitObject {
    /// Horizontal position in the 512 unit lane space.
    pub x: i32,
    pub start_time: f64,
    /// Bit flags, bit 0 set means a plain tap note and anything else is a hold.
    pub object_type: u32,
    #[serde(default)]
    pub hold_end: Option<f64>,
}

impl HitObject {
    pub fn is_tap(&self) -> bool {
        self.object_type & 1 != 0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ChartMetadata {
    pub title: String,
    pub artist: String,
    pub creator: String,
    pub version: String,
    pub audio_filename: String,
    pub background: String,
    pub key_count: u8,
    pub mode: u8,
}

/// Stable sort by offset, so points sharing an offset keep their chart order.
pub fn sort_by_offset(points: &mut [TimingPoint]) {
    points.sort_by(|a, b| a.offset.total_cmp(&b.offset));
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Chart {
    pub metadata: ChartMetadata,
    pub timing_points: Vec<TimingPoint>,
    pub hit_objects: Vec<HitObject>,
}

impl Chart {
    /// Orders the timing points by offset, keeping the file order for ties.
    pub fn sort_timing_points(&mut self) {
        sort_by_offset(&mut self.timing_points);
    }

    /// The earliest timing point, whose tempo governs every tick conversion.
    pub fn governing_point(&self) -> Option<&TimingPoint> {
        self.timing_points.first()
    }

    /// Checks the numeric invariants every front-end has to uphold before
    /// any of the chart reaches the transcoders.
    pub fn validate(&self) -> Result<(), ConvertError> {
        for (index, tp) in self.timing_points.iter().enumerate() {
            if !tp.offset.is_finite() {
                return Err(invalid(format!("timing point #{index} has offset {}", tp.offset)));
            }
            if tp.time_signature == 0 {
                return Err(invalid(format!("timing point #{index} has a time signature of 0")));
            }
            if !tp.beat_length.is_finite() || tp.beat_length == 0.0 {
                return Err(invalid(format!(
                    "timing point #{index} has beat length {}",
                    tp.beat_length
                )));
            }
            if !tp.velocity.is_finite() || tp.velocity <= 0.0 {
                return Err(invalid(format!(
                    "timing point #{index} has velocity {}",
                    tp.velocity
                )));
            }
            if let Some(bpm) = tp.bpm
                && (!bpm.is_finite() || bpm <= 0.0 || tp.beat_length < 0.0)
            {
                return Err(invalid(format!(
                    "timing point #{index} declares BPM {bpm} with beat length {}",
                    tp.beat_length
                )));
            }
        }

        for (index, object) in self.hit_objects.iter().enumerate() {
            if !object.start_time.is_finite() {
                return Err(invalid(format!(
                    "hit object #{index} has start time {}",
                    object.start_time
                )));
            }
        }

        Ok(())
    }
}

fn invalid(message: String) -> ConvertError {
    ConvertError::InvalidChart(message)
}
