use std::path::Path;
use std::process::Command;

use tracing::debug;

/// Read the audio duration in seconds from file metadata.
///
/// WAV headers are read directly via hound; every other container goes
/// through FFprobe. Returns `None` on any failure (unsupported format,
/// unreadable file, missing duration field, FFprobe not installed) since
/// speaking-rate analytics are optional output.
pub fn probe_duration(input: &Path) -> Option<f64> {
    let is_wav = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);

    let duration = if is_wav {
        wav_duration(input).or_else(|| ffprobe_duration(input))
    } else {
        ffprobe_duration(input)
    };

    match duration {
        Some(secs) if secs >= 0.0 => Some(secs),
        Some(secs) => {
            debug!("Ignoring negative duration {secs} for {}", input.display());
            None
        }
        None => {
            debug!("Could not determine duration for {}", input.display());
            None
        }
    }
}

/// Duration from the WAV header.
fn wav_duration(input: &Path) -> Option<f64> {
    let reader = hound::WavReader::open(input).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    Some(f64::from(reader.duration()) / f64::from(spec.sample_rate))
}

/// Duration from container metadata via FFprobe.
fn ffprobe_duration(input: &Path) -> Option<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input)
        .output()
        .ok()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("FFprobe failed for {}: {}", input.display(), stderr.trim());
        return None;
    }

    let duration_str = String::from_utf8_lossy(&output.stdout);
    duration_str.trim().parse::<f64>().ok()
}
