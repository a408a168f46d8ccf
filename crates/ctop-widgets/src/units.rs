#![forbid(unsafe_code)]

//! Byte counts and percentages for the stat lines and table cells.

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;
const TIB: f64 = GIB * 1024.0;

/// Format a byte count.
///
/// In human mode the largest fitting unit of TB, GB or MB is used with one
/// decimal. Otherwise the exact count is printed with `,` thousands
/// separators.
///
/// ```
/// use ctop_widgets::units::bytes_to_human;
///
/// assert_eq!(bytes_to_human(3 * 1024 * 1024 * 1024, true), "3.0GB");
/// assert_eq!(bytes_to_human(1_234_567, false), "1,234,567");
/// ```
#[must_use]
pub fn bytes_to_human(bytes: u64, human: bool) -> String {
    if !human {
        return group_digits(bytes);
    }
    let value = bytes as f64;
    if value / TIB > 1.0 {
        format!("{:.1}TB", value / TIB)
    } else if value / GIB >= 1.0 {
        format!("{:.1}GB", value / GIB)
    } else {
        format!("{:.1}MB", value / MIB)
    }
}

/// `part` as a percentage of `total`, one decimal. A zero total is `0.0%`.
#[must_use]
pub fn percent(total: u64, part: u64) -> String {
    if total == 0 {
        return "0.0%".to_owned();
    }
    format!("{:.1}%", 100.0 * part as f64 / total as f64)
}

fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_picks_unit() {
        assert_eq!(bytes_to_human(512 * 1024 * 1024, true), "512.0MB");
        assert_eq!(bytes_to_human(1024 * 1024 * 1024, true), "1.0GB");
        assert_eq!(bytes_to_human(1536 * 1024 * 1024, true), "1.5GB");
        assert_eq!(bytes_to_human(2 * 1024 * 1024 * 1024 * 1024, true), "2.0TB");
        assert_eq!(bytes_to_human(0, true), "0.0MB");
    }

    #[test]
    fn exactly_one_terabyte_stays_in_gigabytes() {
        assert_eq!(bytes_to_human(1024 * 1024 * 1024 * 1024, true), "1024.0GB");
    }

    #[test]
    fn plain_mode_groups_digits() {
        assert_eq!(bytes_to_human(0, false), "0");
        assert_eq!(bytes_to_human(999, false), "999");
        assert_eq!(bytes_to_human(1000, false), "1,000");
        assert_eq!(bytes_to_human(12_345_678, false), "12,345,678");
    }

    #[test]
    fn scaled_helpers() {
    }

    #[test]
    fn percent_formats_one_decimal() {
        assert_eq!(percent(200, 50), "25.0%");
        assert_eq!(percent(3, 1), "33.3%");
        assert_eq!(percent(0, 10), "0.0%");
    }
}
