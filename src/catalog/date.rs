use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%b %d, %Y", "%B %d, %Y"];

/// Parses the date and timestamp spellings found in catalog cells.
/// Date-only input is taken as midnight.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    parse_timestamp(text).map(|timestamp| timestamp.date())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[rstest]
    #[case("2018-01-31")]
    #[case("1/31/2018")]
    #[case("01/31/2018")]
    #[case("Jan 31, 2018")]
    #[case("January 31, 2018")]
    #[case(" 2018-01-31 ")]
    #[case("2018-01-31 23:59:59")]
    #[case("1/31/2018 8:15")]
    #[case("2018-01-31T10:00:00")]
    #[case("2018-01-31T10:00:00+05:00")]
    fn parses_date(#[case] input: &str) {
        assert_eq!(Some(date(2018, 1, 31)), parse_date(input));
    }

    #[test]
    fn keeps_time_of_day() {
        assert_eq!(
            Some(date(2018, 2, 15).and_hms_opt(13, 45, 10).unwrap()),
            parse_timestamp("2018-02-15 13:45:10"),
        );
    }

    #[test]
    fn date_only_is_midnight() {
        assert_eq!(
            Some(date(2018, 2, 15).and_time(NaiveTime::MIN)),
            parse_timestamp("2/15/2018"),
        );
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("yesterday")]
    #[case("2018-02-30")]
    #[case("13/01/2018")]
    #[case("2018-01")]
    fn rejects_invalid(#[case] input: &str) {
        assert_eq!(None, parse_date(input));
    }
}
