use crate::error::ConvertError;
use crate::model::lanes::Lane;
use crate::util::Real;
use std::fmt;

/// Fixed denominator written after every BEAT signature.
pub const BEAT_DENOMINATOR: u32 = 4;

/// Trailing attributes shared by every note record.
const NOTE_ATTRIBUTES: (u8, u8, u8) = (8, 0, 0);

/// A single MGXC line produced by the timeline and note transcoders.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// A time signature starting at the given section.
    Beat { section: i64, signature: u32 },

    /// A scroll velocity change starting at the given tick.
    Til { tick: i64, velocity: f64 },

    /// The single global tempo declaration.
    Bpm { bpm: f64 },

    Tap { tick: i64, lane: Lane },

    HoldHead { tick: i64, lane: Lane },

    HoldTail { tick: i64, lane: Lane },
}

impl Record {
    fn fmt_note(
        f: &mut fmt::Formatter<'_>,
        tags: [&str; 4],
        tick: i64,
        lane: &Lane,
    ) -> fmt::Result {
        let (a, b, c) = NOTE_ATTRIBUTES;
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            tags[0], tags[1], tags[2], tags[3], tick, lane.offset, lane.width, a, b, c
        )
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Beat { section, signature } => {
                write!(f, "BEAT\t{}\t{}\t{}", section, signature, BEAT_DENOMINATOR)
            }
            Record::Til { tick, velocity } => write!(f, "TIL\t0\t{}\t{}", tick, Real(*velocity)),
            Record::Bpm { bpm } => write!(f, "BPM\t0\t{}", Real(*bpm)),
            Record::Tap { tick, lane } => Self::fmt_note(f, ["t", "N", "N", "N"], *tick, lane),
            Record::HoldHead { tick, lane } => {
                Self::fmt_note(f, ["h", "BG", "N", "N"], *tick, lane)
            }
            Record::HoldTail { tick, lane } => {
                Self::fmt_note(f, [".h", "EN", "N", "N"], *tick, lane)
            }
        }
    }
}

/// Destination for records, handed to the transcoders explicitly.
pub trait RecordSink {
    fn emit(&mut self, record: Record) -> Result<(), ConvertError>;
}

impl RecordSink for Vec<Record> {
    fn emit(&mut self, record: Record) -> Result<(), ConvertError> {
        self.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn header_records_render() {
        let beat = Record::Beat {
            section: 0,
            signature: 4,
        };
        let til = Record::Til {
            tick: 960,
            velocity: 0.75,
        };
        let bpm = Record::Bpm { bpm: 133.0 };

        assert_eq!(beat.to_string(), "BEAT\t0\t4\t4");
        assert_eq!(til.to_string(), "TIL\t0\t960\t0.75");
        assert_eq!(bpm.to_string(), "BPM\t0\t133");
    }

    #[test]
    fn note_records_render() {
        let lane = Lane {
            offset: 4,
            width: 4,
        };

        assert_eq!(
            Record::Tap { tick: 480, lane }.to_string(),
            "t\tN\tN\tN\t480\t4\t4\t8\t0\t0"
        );
        assert_eq!(
            Record::HoldHead { tick: 480, lane }.to_string(),
            "h\tBG\tN\tN\t480\t4\t4\t8\t0\t0"
        );
        assert_eq!(
            Record::HoldTail { tick: 960, lane }.to_string(),
            ".h\tEN\tN\tN\t960\t4\t4\t8\t0\t0"
        );
    }
}
