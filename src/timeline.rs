use crate::error::ConvertError;
use crate::model::chart::{TimingPoint, sort_by_offset};
use crate::model::record::{Record, RecordSink};
use crate::util::round_i64;
use log::{debug, warn};

/// MGXC ticks per beat.
pub const BEAT_TICKS: f64 = 480.0;

/// How far a signature change may sit from a section boundary and still count as aligned.
const SECTION_EPSILON: f64 = 0.001;

/// Accumulated position after the last timing point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimelineSummary {
    pub beats: f64,
    pub sections: f64,
    pub misaligned_signatures: usize,
}

/// Fails if the chart declares more than one distinct BPM.
pub fn ensure_single_bpm(points: &[TimingPoint]) -> Result<(), ConvertError> {
    let mut bpms: Vec<f64> = Vec::new();
    for bpm in points.iter().filter_map(|tp| tp.bpm) {
        if !bpms.contains(&bpm) {
            bpms.push(bpm);
        }
    }

    if bpms.len() > 1 {
        return Err(ConvertError::UnsupportedTempoChange { bpms });
    }

    Ok(())
}

/// Emits the BEAT, TIL and BPM records describing the chart's timeline.
///
/// Sorts `points` by offset in place first. All beat math uses the earliest
/// point's beat length; later points only ever change velocity or signature.
pub fn transcode_timeline<S: RecordSink>(
    points: &mut [TimingPoint],
    sink: &mut S,
) -> Result<TimelineSummary, ConvertError> {
    ensure_single_bpm(points)?;
    sort_by_offset(points);
    let points: &[TimingPoint] = points;

    let governing = points.first().ok_or(ConvertError::NoTimingPoints)?;
    let bpm = governing.bpm.ok_or(ConvertError::MissingGoverningTempo)?;
    let beat_length = governing.beat_length;

    let mut summary = TimelineSummary::default();
    let mut previous: Option<&TimingPoint> = None;
    let mut iter = points.iter().peekable();

    while let Some(tp) = iter.next() {
        let tick = round_i64(summary.beats * BEAT_TICKS);

        if previous.is_none_or(|prev| prev.time_signature != tp.time_signature) {
            let nearest = summary.sections.round_ties_even();
            if (summary.sections - nearest).abs() > SECTION_EPSILON {
                summary.misaligned_signatures += 1;
                warn!(
                    "Signature change to {}/4 at {}ms is not at the beginning of a section (section {:.3}), skipping BEAT..!",
                    tp.time_signature, tp.offset, summary.sections
                );
            } else {
                sink.emit(Record::Beat {
                    section: nearest as i64,
                    signature: tp.time_signature,
                })?;
            }
        }

        if previous.is_none_or(|prev| prev.velocity != tp.velocity) {
            sink.emit(Record::Til {
                tick,
                velocity: tp.velocity,
            })?;
        }

        if let Some(next) = iter.peek() {
            let duration_ms = next.offset - tp.offset;
            summary.beats += duration_ms / beat_length;
            summary.sections += duration_ms / beat_length / tp.time_signature as f64;
        }

        previous = Some(tp);
    }

    sink.emit(Record::Bpm { bpm })?;

    debug!(
        "Timeline spans {:.3} beats over {:.3} sections..!",
        summary.beats, summary.sections
    );

    Ok(summary)
}

#[cfg(test)]
mod test {
    use super::*;

    const BEAT_LENGTH: f64 = 451.127819548872;

    fn governing() -> TimingPoint {
        TimingPoint {
            offset: 169.0,
            beat_length: BEAT_LENGTH,
            time_signature: 4,
            velocity: 1.0,
            bpm: Some(133.0),
        }
    }

    fn inherited(offset: f64, time_signature: u32, velocity: f64) -> TimingPoint {
        TimingPoint {
            offset,
            beat_length: -100.0 / velocity,
            time_signature,
            velocity,
            bpm: None,
        }
    }

    #[test]
    fn single_governing_point() {
        env_logger::try_init().unwrap_or(());

        let mut records = Vec::new();
        let summary = transcode_timeline(&mut [governing()], &mut records).unwrap();

        assert_eq!(
            records,
            vec![
                Record::Beat {
                    section: 0,
                    signature: 4
                },
                Record::Til {
                    tick: 0,
                    velocity: 1.0
                },
                Record::Bpm { bpm: 133.0 },
            ]
        );
        assert_eq!(summary, TimelineSummary::default());
    }

    #[test]
    fn tempo_change_fails_before_any_record() {
        env_logger::try_init().unwrap_or(());

        let mut second = governing();
        second.offset = 10_000.0;
        second.beat_length = 500.0;
        second.bpm = Some(120.0);

        let mut records = Vec::new();
        let result = transcode_timeline(&mut [governing(), second], &mut records);

        assert!(matches!(
            result,
            Err(ConvertError::UnsupportedTempoChange { .. })
        ));
        assert!(records.is_empty());
    }

    #[test]
    fn repeated_bpm_is_not_a_change() {
        env_logger::try_init().unwrap_or(());

        let mut second = governing();
        second.offset = 169.0 + BEAT_LENGTH * 8.0;

        let mut records = Vec::new();
        transcode_timeline(&mut [governing(), second], &mut records).unwrap();

        // same signature and velocity, so only the opening markers and the BPM
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn empty_and_inherited_first_point() {
        let mut records = Vec::new();
        assert!(matches!(
            transcode_timeline(&mut [], &mut records),
            Err(ConvertError::NoTimingPoints)
        ));
        assert!(matches!(
            transcode_timeline(&mut [inherited(0.0, 4, 1.0)], &mut records),
            Err(ConvertError::MissingGoverningTempo)
        ));
    }

    #[test]
    fn unsorted_points_are_sorted_before_transcoding() {
        env_logger::try_init().unwrap_or(());

        let governing = TimingPoint {
            offset: 0.0,
            beat_length: 500.0,
            time_signature: 4,
            velocity: 1.0,
            bpm: Some(120.0),
        };
        let mut points = vec![inherited(2000.0, 4, 0.5), governing.clone()];

        let mut records = Vec::new();
        transcode_timeline(&mut points, &mut records).unwrap();

        assert_eq!(
            records,
            vec![
                Record::Beat {
                    section: 0,
                    signature: 4
                },
                Record::Til {
                    tick: 0,
                    velocity: 1.0
                },
                Record::Til {
                    tick: 1920,
                    velocity: 0.5
                },
                Record::Bpm { bpm: 120.0 },
            ]
        );
        assert_eq!(points[0], governing);
    }

    #[test]
    fn sections_accumulate_piecewise() {
        env_logger::try_init().unwrap_or(());

        // 8 beats of 4/4, then 6 beats of 3/4, then a final 4/4 point
        let second_offset = 169.0 + BEAT_LENGTH * 8.0;
        let third_offset = second_offset + BEAT_LENGTH * 6.0;
        let mut points = vec![
            governing(),
            inherited(second_offset, 3, 0.75),
            inherited(third_offset, 4, 1.0),
        ];

        let mut records = Vec::new();
        let summary = transcode_timeline(&mut points, &mut records).unwrap();

        let expected_sections = (second_offset - 169.0) / BEAT_LENGTH / 4.0
            + (third_offset - second_offset) / BEAT_LENGTH / 3.0;
        assert!((summary.sections - expected_sections).abs() < 1e-9);
        assert!((summary.beats - 14.0).abs() < 1e-9);
        assert_eq!(summary.misaligned_signatures, 0);

        let beats: Vec<_> = records
            .iter()
            .filter_map(|r| match r {
                Record::Beat { section, signature } => Some((*section, *signature)),
                _ => None,
            })
            .collect();
        assert_eq!(beats, vec![(0, 4), (2, 3), (4, 4)]);

        let tils: Vec<_> = records
            .iter()
            .filter_map(|r| match r {
                Record::Til { tick, velocity } => Some((*tick, *velocity)),
                _ => None,
            })
            .collect();
        assert_eq!(tils, vec![(0, 1.0), (3840, 0.75), (6720, 1.0)]);
        assert_eq!(records.last(), Some(&Record::Bpm { bpm: 133.0 }));
    }

    #[test]
    fn misaligned_signature_is_skipped() {
        env_logger::try_init().unwrap_or(());

        // signature change after 6 beats of 4/4, halfway through section 1
        let mut points = vec![
            governing(),
            inherited(169.0 + BEAT_LENGTH * 6.0, 3, 1.0),
            inherited(169.0 + BEAT_LENGTH * 12.0, 3, 0.5),
        ];

        let mut records = Vec::new();
        let summary = transcode_timeline(&mut points, &mut records).unwrap();

        assert_eq!(summary.misaligned_signatures, 1);
        assert!(
            records
                .iter()
                .all(|r| !matches!(r, Record::Beat { signature: 3, .. }))
        );

        // the accumulators still advance past the skipped marker
        assert!(records.contains(&Record::Til {
            tick: 5760,
            velocity: 0.5
        }));
        assert!((summary.sections - 3.5).abs() < 1e-9);
    }
}
