//! Whole-container extraction of the audio track.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, info, warn};

use super::{AudioTrackExtractor, ExtractOptions, Record, RecordSource, StreamKind};
use crate::audio::WavVariant;
use crate::constants::status;
use crate::error::Result;
use crate::progress;
use crate::summary::SummaryReport;

/// Append the variant's extension unless `output` already carries it.
#[must_use]
pub fn output_path_for(output: &Path, variant: WavVariant) -> PathBuf {
    let has_extension = output
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(variant.extension()));
    if has_extension {
        return output.to_path_buf();
    }
    let mut path = output.as_os_str().to_owned();
    path.push(".");
    path.push(variant.extension());
    PathBuf::from(path)
}

/// Make sure the folder that will receive the segments exists.
///
/// Returns the failure status for the summary when it cannot be used.
fn prepare_folder(folder: &Path) -> std::result::Result<(), String> {
    if folder.as_os_str().is_empty() {
        return Ok(());
    }
    if !folder.exists()
        && let Err(e) = std::fs::create_dir_all(folder)
    {
        return Err(format!(
            "Can't create output folder {}: {e}",
            folder.display()
        ));
    }
    if !folder.is_dir() {
        return Err(format!(
            "Can't write output files at {}, because something is there...",
            folder.display()
        ));
    }
    Ok(())
}

/// Extract the single audio stream of `source` into segment files.
///
/// Segments are written next to `output` (with the variant's extension
/// appended if missing). Setting `stop` ends the extraction after the
/// current record; the open segment is still finalized.
///
/// Problems with the container layout or the output folder are reported in
/// the summary status rather than as errors.
///
/// # Errors
///
/// Returns an error only for failures that prevent building a summary.
pub fn extract_audio_track(
    source: &mut dyn RecordSource,
    output: &Path,
    options: &ExtractOptions,
    stop: &AtomicBool,
) -> Result<SummaryReport> {
    let output = output_path_for(output, options.variant);
    let input = source.path_or_uri();
    let folder = output.parent().map(Path::to_path_buf).unwrap_or_default();

    if let Err(status) = prepare_folder(&folder) {
        error!("{status}");
        return Ok(SummaryReport::failed(input, output, status));
    }

    let streams = source.streams();
    let mut audio_streams = streams.iter().filter(|s| s.kind == StreamKind::Audio);
    let stream = match (audio_streams.next(), audio_streams.next()) {
        (Some(stream), None) => stream.clone(),
        (Some(_), Some(_)) => {
            warn!("{}", status::MULTIPLE_AUDIO_TRACKS);
            return Ok(SummaryReport::failed(
                input,
                output,
                status::MULTIPLE_AUDIO_TRACKS,
            ));
        }
        (None, _) => {
            warn!("{}", status::NO_AUDIO_TRACK);
            return Ok(SummaryReport::failed(input, output, status::NO_AUDIO_TRACK));
        }
    };

    info!("Extracting audio stream {} from {input}", stream.id);
    let mut extractor = AudioTrackExtractor::new(&folder, &stream.id, options);
    let record_progress = progress::create_record_progress(options.show_progress);

    // Only a record refused because of the flag makes the run incomplete.
    let mut interrupted = false;
    let read_result = source.read_records(&stream.id, &mut |record: &Record<'_>| {
        if stop.load(Ordering::Relaxed) {
            interrupted = true;
            return ControlFlow::Break(());
        }
        progress::inc_progress(record_progress.as_ref());
        extractor.on_record(record)
    });
    progress::finish_progress(record_progress, "done");

    if let Err(e) = read_result {
        error!("{e}");
        extractor.fail(e.with_sources());
    }
    if interrupted {
        warn!("{}", status::INTERRUPTED);
        extractor.fail(status::INTERRUPTED);
    }

    let mut report = SummaryReport::new(input, output);
    report.stream_id = Some(stream.id.clone());
    report.stream_flavor = stream.flavor.clone();
    if let Some((first, last)) = source.image_time_range() {
        report.first_image_timestamp = Some(first);
        report.last_image_timestamp = Some(last);
    }

    Ok(extractor.finish(report))
}
