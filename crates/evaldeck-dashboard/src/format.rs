use std::time::Duration;

pub fn ellipsize(input: &str, max: usize) -> String {
    if input.chars().count() <= max {
        return input.to_string();
    }
    if max <= 3 {
        return "...".chars().take(max).collect();
    }
    let prefix: String = input.chars().take(max - 3).collect();
    format!("{prefix}...")
}

/// Truncate to `width` with an ellipsis, then right-pad with spaces so
/// columns built from plain spans stay aligned.
pub fn truncate_pad(input: &str, width: usize) -> String {
    let truncated = ellipsize(input, width);
    let len = truncated.chars().count();
    if len < width {
        format!("{truncated}{}", " ".repeat(width - len))
    } else {
        truncated
    }
}

/// Elapsed time as `H:MM:SS` (hours unbounded).
pub fn progress_time(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ellipsize_keeps_short_input() {
        assert_eq!(ellipsize("short", 10), "short");
    }

    #[test]
    fn ellipsize_truncates_with_marker() {
        assert_eq!(ellipsize("a-very-long-task-name", 10), "a-very-...");
    }

    #[test]
    fn truncate_pad_fills_to_width() {
        let padded = truncate_pad("abc", 6);
        assert_eq!(padded, "abc   ");
        assert_eq!(padded.chars().count(), 6);
    }

    #[test]
    fn progress_time_formats_hours_minutes_seconds() {
        assert_eq!(progress_time(Duration::from_secs(0)), "0:00:00");
        assert_eq!(progress_time(Duration::from_secs(62)), "0:01:02");
        assert_eq!(progress_time(Duration::from_secs(3661)), "1:01:01");
        assert_eq!(progress_time(Duration::from_secs(36_000)), "10:00:00");
    }
}
