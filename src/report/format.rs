//! Size formatting shared by the text reports

const KIB: u64 = 1 << 10;
const MIB: u64 = 1 << 20;
const GIB: u64 = 1 << 30;
const TIB: u64 = 1 << 40;

/// Format a byte count
///
/// With `sz_bytes` the plain number is printed. Otherwise the largest binary
/// unit strictly exceeded is used with three decimals.
///
/// # Example
/// ```
/// use damon_report::report::format_size;
///
/// assert_eq!(format_size(4096, true), "4096");
/// assert_eq!(format_size(4096, false), "4.000 KiB");
/// assert_eq!(format_size(1024, false), "1024 B");
/// ```
pub fn format_size(number: u64, sz_bytes: bool) -> String {
    if sz_bytes {
        return number.to_string();
    }
    let n = number as f64;
    if number > TIB {
        format!("{:.3} TiB", n / TIB as f64)
    } else if number > GIB {
        format!("{:.3} GiB", n / GIB as f64)
    } else if number > MIB {
        format!("{:.3} MiB", n / MIB as f64)
    } else if number > KIB {
        format!("{:.3} KiB", n / KIB as f64)
    } else {
        format!("{} B", number)
    }
}
