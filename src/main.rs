use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::{debug, info};
use mania2mgxc::{Args, ConversionReport, convert_file, convert_to_bytes};

fn main() -> Result<()> {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let options = args.options()?;
    info!("Converting chart: '{}'...", args.source.display());

    if args.dry_run {
        let (report, bytes) = convert_to_bytes(&args.source, &options)?;
        log_report(&report);
        info!(
            "Dry run: {} byte(s) not written to '{}'..!",
            bytes.len(),
            args.output.display()
        );
        return Ok(());
    }

    let report = convert_file(&args.source, &args.output, &options)?;
    log_report(&report);

    Ok(())
}

fn log_report(report: &ConversionReport) {
    info!(
        "Converted '{}' ({}K): {} tap(s), {} hold(s), {} line(s)..!",
        report.title, report.key_count, report.notes.taps, report.notes.holds, report.lines
    );
    debug!(
        "SONGID {} | {:.3} beats, {:.3} sections, {} misaligned signature change(s)",
        report.song_id,
        report.timeline.beats,
        report.timeline.sections,
        report.timeline.misaligned_signatures
    );
}
