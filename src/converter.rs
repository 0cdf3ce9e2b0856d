use crate::error::ConvertError;
use crate::model::chart::Chart;
use crate::model::config::ConvertOptions;
use crate::model::lanes::layout;
use crate::notes::{NoteSummary, transcode_notes};
use crate::osu_importer::import_osu_file;
use crate::timeline::{TimelineSummary, ensure_single_bpm, transcode_timeline};
use crate::writer::{MetaFields, MgxcWriter};
use anyhow::{Result, anyhow};
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub title: String,
    pub song_id: String,
    pub key_count: u8,
    pub lines: usize,
    pub timeline: TimelineSummary,
    pub notes: NoteSummary,
}

/// Load a source chart, picking the front-end by file extension.
pub fn load_chart<P: AsRef<Path>>(path: P) -> Result<Chart> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if !is_json {
        return import_osu_file(path);
    }

    let text = fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read chart {}: {}", path.display(), e))?;
    let chart = serde_json::from_str(&text).map_err(ConvertError::from)?;
    debug!("Loaded JSON chart from {}", path.display());
    Ok(chart)
}

/// Runs the whole pipeline, writing the MGXC chart into `out`.
///
/// The chart is validated before the first line is written, so a tempo change
/// or an unsupported key count never produces a partial preamble.
pub fn convert_chart<W: Write>(
    mut chart: Chart,
    options: &ConvertOptions,
    out: W,
) -> Result<ConversionReport, ConvertError> {
    chart.validate()?;
    chart.sort_timing_points();
    ensure_single_bpm(&chart.timing_points)?;

    let governing = chart
        .governing_point()
        .cloned()
        .ok_or(ConvertError::NoTimingPoints)?;
    if governing.bpm.is_none() {
        return Err(ConvertError::MissingGoverningTempo);
    }

    let key_count = chart.metadata.key_count;
    layout(key_count)?;

    let song_id = options
        .song_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut writer = MgxcWriter::new(out);
    writer.write_preamble(&MetaFields {
        metadata: &chart.metadata,
        governing: &governing,
        difficulty: options.difficulty,
        song_id: &song_id,
    })?;

    writer.begin("HEADER")?;
    let timeline = transcode_timeline(&mut chart.timing_points, &mut writer)?;

    writer.begin("NOTES")?;
    let notes = transcode_notes(&governing, &chart.hit_objects, key_count, &mut writer)?;

    let lines = writer.lines_written();
    writer.finish()?;

    Ok(ConversionReport {
        title: chart.metadata.title,
        song_id,
        key_count,
        lines,
        timeline,
        notes,
    })
}

/// Converts `source` fully in memory.
pub fn convert_to_bytes<P: AsRef<Path>>(
    source: P,
    options: &ConvertOptions,
) -> Result<(ConversionReport, Vec<u8>)> {
    let chart = load_chart(source)?;
    let mut buffer = Vec::new();
    let report = convert_chart(chart, options, &mut buffer)?;
    Ok((report, buffer))
}

/// Converts `source` and replaces `output` with the result in one step.
/// On any error the output path is left untouched.
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    output: Q,
    options: &ConvertOptions,
) -> Result<ConversionReport> {
    let (report, bytes) = convert_to_bytes(source, options)?;
    persist_atomically(output.as_ref(), &bytes)?;

    info!(
        "Wrote {} line(s) to {}..!",
        report.lines,
        output.as_ref().display()
    );

    Ok(report)
}

fn persist_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| {
        anyhow!(
            "Failed to create a temporary file in {}: {}",
            dir.display(),
            e
        )
    })?;

    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e.error))?;

    Ok(())
}
