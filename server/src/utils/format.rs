//! Human-readable formatting.

const UNITS: [&str; 8] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB"];
const OVERFLOW_UNIT: &str = "YiB";

/// Format a byte count with 1024-based units.
///
/// Plain bytes are printed without decimals, larger units with one decimal.
/// Anything past zebibytes is expressed in yobibytes.
///
/// ```no_run
/// use server::utils::human_size;
///
/// assert_eq!(human_size(512), "512 B");
/// assert_eq!(human_size(1536), "1.5 KiB");
/// ```
pub fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    for unit in UNITS {
        // Compare what will be printed, so 1023.96 KiB shows as 1.0 MiB.
        if (value * 10.0).round() / 10.0 < 1024.0 {
            return format!("{value:.1} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1} {OVERFLOW_UNIT}")
}
