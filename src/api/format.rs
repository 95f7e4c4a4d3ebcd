/// Whole euros with `.` grouping, e.g. `360.000 €`. Non-finite values render as `–`.
pub fn format_euro(value: f64) -> String {
    if !value.is_finite() {
        return "–".to_string();
    }

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{grouped} €")
}

pub fn format_duration(months: u32) -> String {
    let years = months / 12;
    let remaining_months = months % 12;

    if years == 0 {
        return format!("{remaining_months} {}", plural(remaining_months, "month"));
    }

    let mut text = format!("{years} {}", plural(years, "year"));
    if remaining_months > 0 {
        text.push_str(&format!(
            " {remaining_months} {}",
            plural(remaining_months, "month")
        ));
    }
    text
}

fn plural(count: u32, unit: &str) -> String {
    if count == 1 {
        unit.to_string()
    } else {
        format!("{unit}s")
    }
}
