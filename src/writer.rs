use crate::error::ConvertError;
use crate::model::chart::{ChartMetadata, TimingPoint};
use crate::model::record::{Record, RecordSink};
use crate::util::{Real, level_from_version};
use std::fmt::Display;
use std::io::Write;

pub const MAGIC: &str = "MGCF0";
pub const FORMAT_VERSION: u32 = 2;

/// Everything the META section needs besides the chart itself.
#[derive(Debug, Clone)]
pub struct MetaFields<'a> {
    pub metadata: &'a ChartMetadata,
    pub governing: &'a TimingPoint,
    pub difficulty: u8,
    pub song_id: &'a str,
}

/// Line-oriented MGXC sink: tab-separated tokens, `\n` line endings.
#[derive(Debug)]
pub struct MgxcWriter<W: Write> {
    out: W,
    lines: usize,
}

impl<W: Write> MgxcWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    pub fn line(&mut self, tokens: &[&dyn Display]) -> Result<(), ConvertError> {
        for (i, token) in tokens.iter().enumerate() {
            if i > 0 {
                self.out.write_all(b"\t")?;
            }
            write!(self.out, "{}", token)?;
        }
        self.out.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    pub fn begin(&mut self, section: &str) -> Result<(), ConvertError> {
        self.line(&[&"BEGIN", &section])
    }

    /// Writes the format header and the whole META section.
    pub fn write_preamble(&mut self, meta: &MetaFields<'_>) -> Result<(), ConvertError> {
        let chart = meta.metadata;
        let bpm = meta.governing.bpm.ok_or(ConvertError::MissingGoverningTempo)?;
        let level = level_from_version(&chart.version);
        let bgm_offset = Real(-meta.governing.offset / 1000.0);

        self.line(&[&MAGIC])?;
        self.line(&[&"VERSION", &FORMAT_VERSION])?;
        self.begin("META")?;
        self.line(&[&"TITLE", &chart.title])?;
        self.line(&[&"ARTIST", &chart.artist])?;
        self.line(&[&"DESIGNER", &chart.creator])?;
        self.line(&[&"DIFFICULTY", &meta.difficulty])?;
        self.line(&[&"PLAYLEVEL", &level])?;
        self.line(&[&"WEATTRIBUTE", &""])?;
        self.line(&[&"CHARTCONST", &level])?;
        self.line(&[&"SONGID", &meta.song_id])?;
        self.line(&[&"BGM", &chart.audio_filename])?;
        self.line(&[&"BGMOFFSET", &bgm_offset])?;
        self.line(&[&"BGMPREVIEW", &"0.00000", &"15.00000"])?;
        self.line(&[&"JACKET", &""])?;
        self.line(&[&"BG", &chart.background])?;
        self.line(&[&"BGSCENE", &""])?;
        self.line(&[&"BGSYNC", &1])?;
        self.line(&[&"FIELDCOL", &0])?;
        self.line(&[&"FIELDBG", &""])?;
        self.line(&[&"FIELDSCENE", &""])?;
        self.line(&[&"MAINTIL", &0])?;
        self.line(&[&"MAINBPM", &Real(bpm)])?;
        self.line(&[&"TUTORIAL", &0])?;
        self.line(&[&"SOFFSET", &1])?;
        self.line(&[&"USECLICK", &1])?;
        self.line(&[&"EXLONG", &0])?;
        self.line(&[&"BGMWAITEND", &0])?;
        self.line(&[&"AUTHOR_LIST", &""])?;
        self.line(&[&"AUTHOR_SITES", &""])?;
        self.line(&[&"DLURL", &""])?;
        self.line(&[&"COPYRIGHT", &""])?;
        self.line(&[&"LICENSE", &"", &""])?;
        Ok(())
    }

    pub fn lines_written(&self) -> usize {
        self.lines
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(mut self) -> Result<W, ConvertError> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> RecordSink for MgxcWriter<W> {
    fn emit(&mut self, record: Record) -> Result<(), ConvertError> {
        self.line(&[&record])
    }
}
