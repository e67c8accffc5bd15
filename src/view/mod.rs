use chrono::{DateTime, Utc};

pub mod list_renderer;
pub mod post_renderer;
pub mod rss_renderer;

pub fn format_published(date_time: &DateTime<Utc>) -> String {
    date_time.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn formats_published_date_for_the_page() {
        let dt = Utc.with_ymd_and_hms(2022, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(format_published(&dt), "May 10, 2022");
    }
}
