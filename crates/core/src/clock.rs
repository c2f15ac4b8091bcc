use crate::types::Seconds;

/// Format a number of seconds as `MM:SS`, flooring to whole seconds.
///
/// Negative and non-finite inputs render as `00:00`. Minutes are not
/// wrapped at an hour, so 3725 seconds renders as `62:05`.
pub fn format_clock(seconds: Seconds) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", whole / 60, whole % 60)
}
