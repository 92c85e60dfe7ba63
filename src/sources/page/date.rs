use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use super::meta::{css, find_key, json_ld_blocks, meta_content};
use super::strategy::StrategyChain;

const JSON_LD_DATE_KEYS: &[&str] = &["datePublished", "dateModified"];

const META_DATE_KEYS: &[&str] = &[
    "article:published_time",
    "publish-date",
    "date",
    "DC.date.issued",
];

/// Longer text under a date-ish class is a wrapper, not a dateline
const MAX_DATE_TEXT_CHARS: usize = 100;

const MONTHS: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap());

static MONTH_DAY_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b({MONTHS})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})\b"
    ))
    .unwrap()
});

static DAY_MONTH_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+({MONTHS})\.?,?\s+(\d{{4}})\b"
    ))
    .unwrap()
});

pub fn date_chain(date_selectors: &[String]) -> StrategyChain<'_, DateTime<Utc>> {
    StrategyChain::new("published_at")
        .then("json_ld", json_ld_date)
        .then("meta", meta_date)
        .then("time_element", time_element)
        .then("date_class", move |doc| date_class(doc, date_selectors))
}

fn json_ld_date(document: &Html) -> Option<DateTime<Utc>> {
    let blocks = json_ld_blocks(document);

    JSON_LD_DATE_KEYS.iter().find_map(|key| {
        blocks
            .iter()
            .filter_map(|block| find_key(block, key))
            .filter_map(|value| value.as_str())
            .find_map(parse_date)
    })
}

fn meta_date(document: &Html) -> Option<DateTime<Utc>> {
    META_DATE_KEYS
        .iter()
        .filter_map(|key| meta_content(document, key))
        .find_map(|value| parse_date(&value))
}

fn time_element(document: &Html) -> Option<DateTime<Utc>> {
    let selector = css("time[datetime]")?;
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("datetime"))
        .find_map(parse_date)
}

fn date_class(document: &Html, selectors: &[String]) -> Option<DateTime<Utc>> {
    selectors
        .iter()
        .filter_map(|selector| css(selector))
        .find_map(|selector| {
            document.select(&selector).find_map(|element| {
                element
                    .value()
                    .attr("datetime")
                    .or_else(|| element.value().attr("content"))
                    .and_then(parse_date)
                    .or_else(|| {
                        let text = crate::normalize::element_text(element);
                        if text.chars().count() < MAX_DATE_TEXT_CHARS {
                            parse_date(&text)
                        } else {
                            None
                        }
                    })
            })
        })
}

/// Parse a date string leniently, falling back to a date embedded in longer text
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    parse_exact(s).or_else(|| find_embedded_date(s))
}

fn parse_exact(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats_with_tz = [
        // "2024-01-02T15:04:05-0700"
        "%Y-%m-%dT%H:%M:%S%z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        // "2024-01-02 15:04:05 +0000"
        "%Y-%m-%d %H:%M:%S %z",
    ];

    for fmt in &formats_with_tz {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // No offset given: assume UTC
    let formats_naive = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    for fmt in &formats_naive {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    let formats_date = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%B %d, %Y",
        "%B %d %Y",
        "%d %B %Y",
        "%d %B, %Y",
        "%m/%d/%Y",
    ];

    formats_date
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(midnight_utc)
}

fn find_embedded_date(text: &str) -> Option<DateTime<Utc>> {
    if let Some(caps) = ISO_DATE_RE.captures(text) {
        let date = NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        );
        if let Some(date) = date {
            return midnight_utc(date);
        }
    }

    if let Some(caps) = MONTH_DAY_YEAR_RE.captures(text) {
        if let Some(date) = ymd(&caps[3], &caps[1], &caps[2]) {
            return midnight_utc(date);
        }
    }

    if let Some(caps) = DAY_MONTH_YEAR_RE.captures(text) {
        if let Some(date) = ymd(&caps[3], &caps[2], &caps[1]) {
            return midnight_utc(date);
        }
    }

    None
}

fn ymd(year: &str, month_name: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month_number(month_name)?, day.parse().ok()?)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}
