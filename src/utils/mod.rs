pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1_000 {
        return format!("{bytes} bytes");
    }

    let mut value = bytes as f64;
    let mut unit = UNITS[0];
    for candidate in UNITS {
        value /= 1_000.0;
        unit = candidate;
        if value < 1_000.0 {
            break;
        }
    }

    format!("{value:.2} {unit}")
}
