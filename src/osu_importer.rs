use crate::error::ConvertError;
use crate::model::chart::*;
use crate::util::round3;
use anyhow::{Result, anyhow};
use log::{debug, warn};
use std::fs;
use std::path::Path;
use std::str::FromStr;

const MANIA_MODE: u8 = 3;
const DEFAULT_METER: u32 = 4;
const HOLD_TYPE_BIT: u32 = 1 << 7;
const MS_PER_MINUTE: f64 = 60_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    General,
    Metadata,
    Difficulty,
    Events,
    TimingPoints,
    HitObjects,
    Other,
}

impl Section {
    fn from_header(name: &str) -> Self {
        match name {
            "General" => Section::General,
            "Metadata" => Section::Metadata,
            "Difficulty" => Section::Difficulty,
            "Events" => Section::Events,
            "TimingPoints" => Section::TimingPoints,
            "HitObjects" => Section::HitObjects,
            _ => Section::Other,
        }
    }
}

#[derive(Default)]
struct RawMetadata {
    title: String,
    title_unicode: String,
    artist: String,
    artist_unicode: String,
    circle_size: Option<f64>,
}

pub fn import_osu_file<P: AsRef<Path>>(path: P) -> Result<Chart> {
    let text = fs::read_to_string(path.as_ref()).map_err(|e| {
        anyhow!(
            "Failed to read osu! file {}: {}",
            path.as_ref().display(),
            e
        )
    })?;

    Ok(parse_osu(&text)?)
}

/// Parse the text of a `.osu` file into a [`Chart`].
pub fn parse_osu(text: &str) -> Result<Chart, ConvertError> {
    let mut chart = Chart::default();
    let mut raw = RawMetadata::default();
    let mut section = Section::Preamble;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim_start_matches('\u{feff}').trim();

        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = Section::from_header(name.trim());
            if section == Section::Other {
                debug!("Skipping unsupported section [{}]..!", name);
            }
            continue;
        }

        match section {
            Section::Preamble => {
                debug!("osu! header: {}", line);
            }
            Section::General | Section::Metadata | Section::Difficulty => {
                let Some((key, value)) = line.split_once(':') else {
                    return Err(parse_error(line_no, format!("expected `key: value`, got '{line}'")));
                };
                apply_key_value(&mut chart.metadata, &mut raw, key.trim(), value.trim(), line_no)?;
            }
            Section::Events => {
                let fields: Vec<&str> = line.split(',').map(str::trim).collect();
                let is_background = fields.len() >= 3
                    && (fields[0] == "0" || fields[0] == "Background")
                    && chart.metadata.background.is_empty();

                if is_background {
                    chart.metadata.background = fields[2].trim_matches('"').to_string();
                }
            }
            Section::TimingPoints => {
                chart.timing_points.push(parse_timing_point(line, line_no)?);
            }
            Section::HitObjects => {
                chart.hit_objects.push(parse_hit_object(line, line_no)?);
            }
            Section::Other => {}
        }
    }

    let metadata = &mut chart.metadata;
    metadata.title = prefer_unicode(raw.title_unicode, raw.title);
    metadata.artist = prefer_unicode(raw.artist_unicode, raw.artist);

    let circle_size = raw
        .circle_size
        .ok_or_else(|| parse_error(0, "missing CircleSize (key count)".into()))?;
    if !(0.0..=u8::MAX as f64).contains(&circle_size) {
        return Err(parse_error(0, format!("invalid CircleSize {circle_size}")));
    }
    metadata.key_count = circle_size.trunc() as u8;

    if metadata.mode != MANIA_MODE {
        warn!(
            "Chart mode is {} rather than osu!mania ({}), converting anyway..!",
            metadata.mode, MANIA_MODE
        );
    }

    debug!(
        "Parsed '{}' [{}]: {}K, {} timing point(s), {} hit object(s)",
        metadata.title,
        metadata.version,
        metadata.key_count,
        chart.timing_points.len(),
        chart.hit_objects.len()
    );

    Ok(chart)
}

fn apply_key_value(
    metadata: &mut ChartMetadata,
    raw: &mut RawMetadata,
    key: &str,
    value: &str,
    line_no: usize,
) -> Result<(), ConvertError> {
    match key {
        "AudioFilename" => metadata.audio_filename = value.to_string(),
        "Mode" => metadata.mode = parse_value(value, "Mode", line_no)?,
        "Title" => raw.title = value.to_string(),
        "TitleUnicode" => raw.title_unicode = value.to_string(),
        "Artist" => raw.artist = value.to_string(),
        "ArtistUnicode" => raw.artist_unicode = value.to_string(),
        "Creator" => metadata.creator = value.to_string(),
        "Version" => metadata.version = value.to_string(),
        "CircleSize" => raw.circle_size = Some(parse_value(value, "CircleSize", line_no)?),
        _ => {}
    }

    Ok(())
}

/// `time,beatLength,meter,sampleSet,sampleIndex,volume,uninherited,effects`
fn parse_timing_point(line: &str, line_no: usize) -> Result<TimingPoint, ConvertError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let offset: f64 = parse_field(&fields, 0, "time", line_no)?;
    let beat_length: f64 = parse_field(&fields, 1, "beatLength", line_no)?;
    let time_signature = match fields.get(2) {
        Some(meter) => parse_value(meter, "meter", line_no)?,
        None => DEFAULT_METER,
    };

    if time_signature == 0 {
        return Err(parse_error(line_no, "meter must be at least 1".into()));
    }

    if !beat_length.is_finite() || beat_length == 0.0 {
        return Err(parse_error(
            line_no,
            format!("invalid beatLength {beat_length}"),
        ));
    }

    let (bpm, velocity) = if beat_length > 0.0 {
        (Some(round3(MS_PER_MINUTE / beat_length)), 1.0)
    } else {
        (None, 100.0 / -beat_length)
    };

    Ok(TimingPoint {
        offset,
        beat_length,
        time_signature,
        velocity,
        bpm,
    })
}

/// `x,y,time,type,hitSound,objectParams,hitSample`; holds carry `endTime:hitSample` in the sixth field.
fn parse_hit_object(line: &str, line_no: usize) -> Result<HitObject, ConvertError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let x: f64 = parse_field(&fields, 0, "x", line_no)?;
    let start_time: f64 = parse_field(&fields, 2, "time", line_no)?;
    let object_type: u32 = parse_field(&fields, 3, "type", line_no)?;

    let mut object = HitObject {
        x: x.floor() as i32,
        start_time,
        object_type,
        hold_end: None,
    };

    if !object.is_tap() {
        object.hold_end = fields
            .get(5)
            .and_then(|params| params.split(':').next())
            .and_then(|end| end.trim().parse::<f64>().ok());

        if object.hold_end.is_none() {
            warn!("Hold note on line {} has no readable end time..!", line_no);
        } else if object_type & HOLD_TYPE_BIT == 0 {
            debug!(
                "Non-tap object on line {} without the hold bit (type {}), treating as a hold..!",
                line_no, object_type
            );
        }
    }

    Ok(object)
}

fn prefer_unicode(unicode: String, ascii: String) -> String {
    if unicode.is_empty() { ascii } else { unicode }
}

fn parse_field<T: FromStr>(
    fields: &[&str],
    idx: usize,
    name: &str,
    line_no: usize,
) -> Result<T, ConvertError> {
    let value = fields
        .get(idx)
        .ok_or_else(|| parse_error(line_no, format!("missing field `{name}`")))?;
    parse_value(value, name, line_no)
}

fn parse_value<T: FromStr>(value: &str, name: &str, line_no: usize) -> Result<T, ConvertError> {
    value
        .trim()
        .parse()
        .map_err(|_| parse_error(line_no, format!("invalid {name} '{value}'")))
}

fn parse_error(line: usize, message: String) -> ConvertError {
    ConvertError::Parse { line, message }
}
