use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Probes media files for their duration. Seam so scans can be tested without
/// real codecs and swapped if the decoding stack changes.
pub trait MetadataExtractor: Send + Sync {
    fn probe_duration_ms(&self, path: &Path) -> Result<u64>;
}

/// Duration probe backed by symphonia's format detection. Reads only the
/// container headers, not the full stream.
pub struct SymphoniaProbe;

impl MetadataExtractor for SymphoniaProbe {
    fn probe_duration_ms(&self, path: &Path) -> Result<u64> {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let source = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                source,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .with_context(|| format!("unrecognized media format: {}", path.display()))?;

        let track = probed
            .format
            .default_track()
            .with_context(|| format!("no default track in {}", path.display()))?;
        let params = &track.codec_params;
        let time_base = params
            .time_base
            .with_context(|| format!("track missing time base in {}", path.display()))?;
        let frames = params
            .n_frames
            .with_context(|| format!("track missing frame count in {}", path.display()))?;

        let time = time_base.calc_time(frames);
        Ok(time.seconds * 1000 + (time.frac * 1000.0) as u64)
    }
}
