use ratatui::prelude::Color;

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Truncate then left-align into exactly `width` characters
pub fn fit(s: &str, width: usize) -> String {
  format!("{:<width$}", truncate(s, width), width = width)
}

/// Display color for shipment and equipment statuses
pub fn status_color(status: &str) -> Color {
  match status.to_ascii_uppercase().as_str() {
    "COMPLETED" | "RECEIVED" | "SHIPPED" | "DELIVERED" | "ACTIVE" | "AVAILABLE" => Color::Green,
    "PENDING" | "IN_TRANSIT" | "PROCESSING" | "IN_USE" => Color::Yellow,
    "CANCELLED" | "FAILED" | "BROKEN" | "OUT_OF_SERVICE" => Color::Red,
    "MAINTENANCE" => Color::Magenta,
    _ => Color::White,
  }
}
