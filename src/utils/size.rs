//! Byte size formatting.

/// Format a byte count with B/KB/MB units (1024-based, one decimal).
///
/// # Examples
///
/// - `format_size(512)` -> `"512 B"`
/// - `format_size(12_700)` -> `"12.4 KB"`
pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    #[allow(clippy::cast_precision_loss)]
    let n = bytes as f64;
    if n < KB {
        format!("{bytes} B")
    } else if n < MB {
        format!("{:.1} KB", n / KB)
    } else {
        format!("{:.1} MB", n / MB)
    }
}
