use chrono::NaiveDate;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::Serializer;

pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s: &str = Deserialize::deserialize(deserializer)?;
    NaiveDate::parse_from_str(s, "%Y%m%d").map_err(serde::de::Error::custom)
}

pub fn serialize_date<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.format("%Y%m%d").to_string())
}

fn parse_time_component(s: &str, max: Option<u32>) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u32 = s.parse().ok()?;
    match max {
        Some(max) if value >= max => None,
        _ => Some(value),
    }
}

/// Parses a `H:MM:SS` or `HH:MM:SS` time into seconds since midnight
///
/// Hours may go past 23, as GTFS allows for trips running after midnight.
pub fn parse_time(s: &str) -> Result<u32, crate::Error> {
    let invalid = || crate::Error::InvalidTime(s.to_owned());
    let mut parts = s.split(':');
    let (h, m, sec) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), Some(sec), None) => (h, m, sec),
        _ => return Err(invalid()),
    };
    if h.len() > 3 || m.len() != 2 || sec.len() != 2 {
        return Err(invalid());
    }
    let hours = parse_time_component(h, None).ok_or_else(invalid)?;
    let minutes = parse_time_component(m, Some(60)).ok_or_else(invalid)?;
    let seconds = parse_time_component(sec, Some(60)).ok_or_else(invalid)?;
    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Formats seconds since midnight as `HH:MM:SS`
pub fn format_time(time: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        time / 3600,
        time % 3600 / 60,
        time % 60
    )
}

pub fn deserialize_time<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let s: &str = Deserialize::deserialize(deserializer)?;
    parse_time(s).map_err(de::Error::custom)
}

pub fn serialize_time<S>(time: &u32, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(format_time(*time).as_str())
}

pub fn de_with_optional_float<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(de).and_then(|s| {
        if s.is_empty() {
            Ok(None)
        } else {
            s.parse().map(Some).map_err(de::Error::custom)
        }
    })
}

pub fn serialize_float_as_str<S>(float: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match float {
        None => serializer.serialize_str(""),
        Some(f) => serializer.serialize_str(&f.to_string()),
    }
}

pub fn deserialize_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s: &str = Deserialize::deserialize(deserializer)?;
    match s {
        "0" => Ok(false),
        "1" => Ok(true),
        &_ => Err(serde::de::Error::custom(format!(
            "Invalid value `{}`, expected 0 or 1",
            s
        ))),
    }
}

pub fn serialize_bool<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}

#[test]
fn test_serialize_time() {
    #[derive(Serialize, Deserialize)]
    struct Test {
        #[serde(
            deserialize_with = "deserialize_time",
            serialize_with = "serialize_time"
        )]
        time: u32,
    }
    let data_in = "time\n01:01:01\n";
    let parsed: Test = csv::Reader::from_reader(data_in.as_bytes())
        .deserialize()
        .next()
        .unwrap()
        .unwrap();
    assert_eq!(3600 + 60 + 1, parsed.time);

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.serialize(parsed).unwrap();
    let data_out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
    assert_eq!(data_in, data_out);
}

#[test]
fn test_parse_time() {
    assert_eq!(8 * 3600 + 5 * 60, parse_time("08:05:00").unwrap());
    assert_eq!(8 * 3600 + 5 * 60, parse_time("8:05:00").unwrap());
    assert_eq!(25 * 3600 + 10 * 60 + 3, parse_time("25:10:03").unwrap());
    for invalid in ["", "08:05", "08:5:00", "08:60:00", "08:00:61", "8h05m00", "a8:05:00", "08:05:00:00"] {
        assert!(
            matches!(parse_time(invalid), Err(crate::Error::InvalidTime(_))),
            "{invalid} should not parse"
        );
    }
}

#[test]
fn test_format_time() {
    assert_eq!("08:05:00", format_time(8 * 3600 + 5 * 60));
    assert_eq!("25:00:09", format_time(25 * 3600 + 9));
}
