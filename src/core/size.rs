//! Human-readable byte sizes

const UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

/// Formats a byte count with 1024-based units and one decimal place,
/// e.g. `1536` becomes `"1.5KiB"`.
pub fn sizeof_fmt(num: u128) -> String {
    let mut value = num as f64;
    for unit in UNITS {
        if value.abs() < 1024.0 {
            return format!("{value:3.1}{unit}B");
        }
        value /= 1024.0;
    }
    format!("{value:.1}YiB")
}
