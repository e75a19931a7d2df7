use chrono::Local;

/// Current wall-clock time formatted the way the JSON surface expects it.
pub fn current_datetime() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Current date, same surface format.
pub fn current_date() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
