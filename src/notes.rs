use crate::error::ConvertError;
use crate::model::chart::{HitObject, TimingPoint};
use crate::model::lanes::{layout, resolve_lane, source_lane};
use crate::model::record::{Record, RecordSink};
use crate::timeline::BEAT_TICKS;
use crate::util::round_i64;
use log::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteSummary {
    pub taps: usize,
    pub holds: usize,
}

/// Converts source milliseconds into MGXC ticks using the governing tempo.
#[derive(Debug, Clone, Copy)]
pub struct TickBase {
    offset: f64,
    beat_length: f64,
}

impl TickBase {
    pub fn new(governing: &TimingPoint) -> Self {
        Self {
            offset: governing.offset,
            beat_length: governing.beat_length,
        }
    }

    /// Notes before the governing point are clamped to tick 0.
    pub fn time_to_tick(&self, time_ms: f64) -> i64 {
        round_i64((time_ms - self.offset) / self.beat_length * BEAT_TICKS).max(0)
    }
}

/// Emits note records for every hit object, in chart order.
pub fn transcode_notes<S: RecordSink>(
    governing: &TimingPoint,
    objects: &[HitObject],
    key_count: u8,
    sink: &mut S,
) -> Result<NoteSummary, ConvertError> {
    layout(key_count)?;
    let base = TickBase::new(governing);
    let mut summary = NoteSummary::default();

    for (index, object) in objects.iter().enumerate() {
        let lane = resolve_lane(key_count, source_lane(object.x, key_count))?;
        let tick = base.time_to_tick(object.start_time);

        if object.is_tap() {
            sink.emit(Record::Tap { tick, lane })?;
            summary.taps += 1;
            continue;
        }

        let end = object
            .hold_end
            .filter(|end| end.is_finite())
            .ok_or(ConvertError::MissingHoldEnd {
                index,
                time: object.start_time,
            })?;

        if end < object.start_time {
            debug!(
                "Hold note #{} ends before it starts ({}ms -> {}ms)..!",
                index, object.start_time, end
            );
        }

        sink.emit(Record::HoldHead { tick, lane })?;
        sink.emit(Record::HoldTail {
            tick: base.time_to_tick(end),
            lane,
        })?;
        summary.holds += 1;
    }

    debug!(
        "Transcoded {} tap(s) and {} hold(s) across {}K..!",
        summary.taps, summary.holds, key_count
    );

    Ok(summary)
}
