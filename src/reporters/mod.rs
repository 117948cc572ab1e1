pub mod html;
pub mod json;
pub mod terminal;

/// Whole scores print without a fraction, others with one decimal.
pub(crate) fn fmt_score(score: f64) -> String {
    if score.fract() == 0.0 { format!("{score:.0}") } else { format!("{score:.1}") }
}

/// Text arrow for a trend icon name from [`crate::products::trend_icon`].
pub(crate) fn trend_arrow(icon: &str) -> &'static str {
    match icon {
        "bi-arrow-up"   => "▲",
        "bi-arrow-down" => "▼",
        _               => "■",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_score() {
        assert_eq!(fmt_score(73.0), "73");
        assert_eq!(fmt_score(65.44), "65.4");
        assert_eq!(fmt_score(0.0), "0");
    }

    #[test]
    fn test_trend_arrow() {
        assert_eq!(trend_arrow("bi-arrow-up"), "▲");
        assert_eq!(trend_arrow("bi-arrow-down"), "▼");
        assert_eq!(trend_arrow("bi-dash"), "■");
        assert_eq!(trend_arrow(""), "■");
    }
}
