mod converter;
mod error;
mod model;
mod notes;
mod osu_importer;
mod timeline;
mod util;
mod writer;

pub use converter::*;
pub use error::*;
pub use model::chart::*;
pub use model::config::*;
pub use model::lanes::*;
pub use model::record::*;
pub use notes::*;
pub use osu_importer::*;
pub use timeline::*;
pub use util::*;
pub use writer::*;
