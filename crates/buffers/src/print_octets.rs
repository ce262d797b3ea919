//! Hex formatting of byte runs for logs and error messages.

use std::fmt::Write;

/// Formats at most `max` bytes as space-separated lowercase hex, noting how
/// many bytes were cut off.
///
/// # Example
///
/// ```
/// use fory_buffers::print_octets;
///
/// assert_eq!(print_octets(&[0x02, 0x40, 0xff], 16), "02 40 ff");
/// assert_eq!(print_octets(&[1, 2, 3], 2), "01 02 ..(+1)");
/// assert_eq!(print_octets(&[], 16), "");
/// ```
pub fn print_octets(octets: &[u8], max: usize) -> String {
    let mut out = String::with_capacity(octets.len().min(max) * 3 + 8);
    for (i, byte) in octets.iter().take(max).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02x}");
    }
    if octets.len() > max {
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "..(+{})", octets.len() - max);
    }
    out
}
