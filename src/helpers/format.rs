/// Compact document count: 950, 1K, 30K, 2M, 1B.
pub fn format_doc_count(count: u64) -> String {
    const UNITS: [(u64, &str); 5] =
        [(1, ""), (1_000, "K"), (1_000_000, "M"), (1_000_000_000, "B"), (1_000_000_000_000, "T")];

    let mut unit = 0;
    while unit + 1 < UNITS.len() && count >= UNITS[unit + 1].0 {
        unit += 1;
    }

    let (scale, suffix) = UNITS[unit];
    let scaled = (count as f64 / scale as f64).round() as u64;
    // Rounding up to 1000 carries into the next unit.
    if scaled >= 1_000 && unit + 1 < UNITS.len() {
        let (next_scale, next_suffix) = UNITS[unit + 1];
        let carried = (count as f64 / next_scale as f64).round() as u64;
        return format!("{carried}{next_suffix}");
    }
    format!("{scaled}{suffix}")
}
