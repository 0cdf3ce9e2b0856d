use crate::error::ConvertError;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_DIFFICULTY: u8 = 3;

#[derive(Parser, Debug)]
#[command(
    name = "convert",
    about = "Convert an osu!mania chart into an MGXC chart!"
)]
pub struct Args {
    /// Path to the source chart (`.osu`, or a `.json` chart dump).
    pub source: PathBuf,

    /// Path of the MGXC chart to write.
    pub output: PathBuf,

    /// Value written to the DIFFICULTY field of the META section.
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
    pub difficulty: u8,

    /// Use a fixed SONGID instead of a freshly generated one.
    #[arg(long = "song-id")]
    pub song_id: Option<String>,

    /// Convert in memory and report, without writing the output file.
    #[arg(short, long, default_value_t = false)]
    pub dry_run: bool,

    /// Prints extra information to the terminal.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Library-side knobs for a single conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub difficulty: u8,
    pub song_id: Option<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            song_id: None,
        }
    }
}

impl Args {
    pub fn options(&self) -> Result<ConvertOptions, ConvertError> {
        if self.source.as_os_str().is_empty() || self.output.as_os_str().is_empty() {
            return Err(ConvertError::Configuration(
                "source and output paths must not be empty".into(),
            ));
        }

        if self.source == self.output {
            return Err(ConvertError::Configuration(format!(
                "refusing to overwrite the source chart {}",
                self.source.display()
            )));
        }

        if let Some(id) = self.song_id.as_deref()
            && id.trim().is_empty()
        {
            return Err(ConvertError::Configuration(
                "--song-id must not be blank".into(),
            ));
        }

        Ok(ConvertOptions {
            difficulty: self.difficulty,
            song_id: self.song_id.clone(),
        })
    }
}
