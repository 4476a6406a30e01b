//! Weather summaries and the day outlook
//!
//! Both pieces of text come from the LLM when the availability handle says so
//! and from fixed templates otherwise. Nothing here fails: every AI problem
//! degrades to the template.

use chrono::{NaiveDate, TimeZone, Timelike};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

use crate::availability::Availability;
use crate::llm::{AiReply, ChatBackend, Generated};
use crate::models::{TimeOfDay, WeatherReading};

const SUMMARY_SYSTEM_PROMPT: &str = "You are a friendly assistant helping a parent explain the \
weather to their kids. Write a concise summary as a single paragraph of two or three sentences. \
Mention the temperature, how it feels and the conditions. Do not use lists.";

const OUTLOOK_SYSTEM_PROMPT: &str = "You are a friendly assistant describing how the rest of \
today's weather will develop. Answer with a short heading line ending in a colon, then one line \
per part of the day starting with '- ', then one closing sentence about the trend. Plain text only.";

/// Fewest words an AI summary may have
const SUMMARY_MIN_WORDS: usize = 12;
/// Most line breaks an AI summary may have
const SUMMARY_MAX_NEWLINES: usize = 2;

/// Mean temperatures further apart than this define a trend (°F)
const TREND_THRESHOLD_F: f64 = 3.0;

/// Part of the day used by the outlook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Morning,
    Afternoon,
    Evening,
}

impl Segment {
    const ALL: [Segment; 3] = [Segment::Morning, Segment::Afternoon, Segment::Evening];

    /// Local hours 06-12, 12-18 and 18-24; earlier hours belong to no segment
    fn for_hour(hour: u32) -> Option<Self> {
        match hour {
            6..=11 => Some(Segment::Morning),
            12..=17 => Some(Segment::Afternoon),
            18..=23 => Some(Segment::Evening),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Segment::Morning => "Morning",
            Segment::Afternoon => "Afternoon",
            Segment::Evening => "Evening",
        }
    }
}

/// Forecast statistics for one non-empty segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySegment {
    pub segment: Segment,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Distinct condition labels, first-seen order
    pub conditions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Steady,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
            Trend::Steady => "steady",
        })
    }
}

/// Today's forecast grouped by segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayOutlook {
    pub segments: Vec<DaySegment>,
    pub trend: Trend,
}

impl DayOutlook {
    /// Group the reading's forecast points that fall on `today` (local to `tz`)
    #[must_use]
    pub fn build<Tz: TimeZone>(reading: &WeatherReading, today: NaiveDate, tz: &Tz) -> Self {
        let mut buckets: [Vec<(f64, &str)>; 3] = Default::default();

        for point in &reading.forecast {
            let local = point.timestamp.with_timezone(tz);
            if local.date_naive() != today {
                continue;
            }
            if let Some(segment) = Segment::for_hour(local.hour()) {
                buckets[segment as usize].push((point.temperature, point.conditions.as_str()));
            }
        }

        let segments: Vec<DaySegment> = Segment::ALL
            .into_iter()
            .zip(buckets)
            .filter(|(_, values)| !values.is_empty())
            .map(|(segment, values)| {
                let temps = values.iter().map(|(t, _)| *t);
                let min = temps.clone().fold(f64::INFINITY, f64::min);
                let max = temps.clone().fold(f64::NEG_INFINITY, f64::max);
                let mean = temps.sum::<f64>() / values.len() as f64;
                let mut conditions: Vec<String> = Vec::new();
                for (_, label) in &values {
                    if !conditions.iter().any(|c| c == label) {
                        conditions.push((*label).to_string());
                    }
                }
                DaySegment {
                    segment,
                    min,
                    max,
                    mean,
                    conditions,
                }
            })
            .collect();

        let trend = trend_of(&segments);
        Self { segments, trend }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Compare the first and last non-empty segment means
fn trend_of(segments: &[DaySegment]) -> Trend {
    match (segments.first(), segments.last()) {
        (Some(first), Some(last)) if segments.len() > 1 => {
            let delta = last.mean - first.mean;
            if delta > TREND_THRESHOLD_F {
                Trend::Rising
            } else if delta < -TREND_THRESHOLD_F {
                Trend::Falling
            } else {
                Trend::Steady
            }
        }
        _ => Trend::Steady,
    }
}

fn time_qualifier(time_of_day: Option<TimeOfDay>) -> String {
    match time_of_day {
        Some(TimeOfDay::Night) => " tonight".to_string(),
        Some(other) => format!(" this {other}"),
        None => String::new(),
    }
}

/// Deterministic summary used whenever the LLM is out of the picture
#[must_use]
pub fn template_summary(reading: &WeatherReading) -> String {
    let location = if reading.location.is_empty() {
        String::new()
    } else {
        format!(" in {}", reading.location)
    };
    format!(
        "It's {:.0}°F (feels like {:.0}°F) with {}{}{}.",
        reading.temperature,
        reading.feels_like,
        reading.conditions,
        location,
        time_qualifier(reading.time_of_day)
    )
}

/// Plain-text outlook built from the segments
#[must_use]
pub fn template_outlook(reading: &WeatherReading, outlook: &DayOutlook) -> String {
    let mut lines = vec!["Today's outlook:".to_string()];

    if outlook.is_empty() {
        lines.push(format!(
            "No more forecast data for today. Expect conditions close to the current {:.0}°F.",
            reading.temperature
        ));
        return lines.join("\n");
    }

    for segment in &outlook.segments {
        let range = if (segment.max - segment.min).abs() < 0.5 {
            format!("around {:.0}°F", segment.mean)
        } else {
            format!("{:.0}°F to {:.0}°F", segment.min, segment.max)
        };
        lines.push(format!(
            "- {}: {}, {}",
            segment.segment.label(),
            range,
            segment.conditions.join(" then ")
        ));
    }

    lines.push(match outlook.trend {
        Trend::Rising => "Temperatures climb as the day goes on.".to_string(),
        Trend::Falling => "Temperatures drop as the day goes on, so bring a layer.".to_string(),
        Trend::Steady => "Temperatures stay about the same all day.".to_string(),
    });
    lines.join("\n")
}

/// The handful of reading fields the model gets to see
#[derive(Serialize)]
struct PromptFacts<'a> {
    location: &'a str,
    temperature_f: f64,
    feels_like_f: f64,
    conditions: &'a str,
    wind_speed_mph: f64,
    humidity_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_of_day: Option<TimeOfDay>,
}

impl<'a> From<&'a WeatherReading> for PromptFacts<'a> {
    fn from(reading: &'a WeatherReading) -> Self {
        Self {
            location: &reading.location,
            temperature_f: reading.temperature,
            feels_like_f: reading.feels_like,
            conditions: &reading.conditions,
            wind_speed_mph: reading.wind_speed,
            humidity_percent: reading.humidity,
            time_of_day: reading.time_of_day,
        }
    }
}

/// Pretty JSON of the reading as embedded in prompts
pub(crate) fn reading_json(reading: &WeatherReading) -> String {
    serde_json::to_string_pretty(&PromptFacts::from(reading)).unwrap_or_default()
}

#[must_use]
pub fn summary_prompt(reading: &WeatherReading, outlook: &DayOutlook) -> String {
    let mut prompt = format!(
        "Describe these weather conditions.\n\nWeather data:\n{}\n",
        reading_json(reading)
    );
    if !outlook.is_empty() {
        prompt.push_str(&format!(
            "\nRest of the day ({} trend):\n{}\n",
            outlook.trend,
            serde_json::to_string_pretty(&outlook.segments).unwrap_or_default()
        ));
    }
    prompt.push_str("\nSummary:");
    prompt
}

#[must_use]
pub fn outlook_prompt(reading: &WeatherReading, outlook: &DayOutlook) -> String {
    format!(
        "Current conditions:\n{}\n\nForecast segments for today (overall trend: {}):\n{}\n\nOutlook:",
        reading_json(reading),
        outlook.trend,
        serde_json::to_string_pretty(&outlook.segments).unwrap_or_default()
    )
}

async fn ask(
    backend: &dyn ChatBackend,
    availability: &Availability,
    system: &str,
    prompt: &str,
    what: &str,
) -> Option<String> {
    if !availability.is_available() {
        debug!("LLM unavailable, using template {}", what);
        return None;
    }
    match backend.chat(system, prompt).await {
        AiReply::Text(text) => Some(text),
        AiReply::Unavailable => {
            warn!("LLM did not answer the {} request, using template", what);
            None
        }
        AiReply::Malformed(reason) => {
            warn!("LLM {} reply unusable ({}), using template", what, reason);
            None
        }
    }
}

/// Whether model text reads as a short paragraph rather than a fragment or a list
#[must_use]
pub fn is_paragraph(text: &str) -> bool {
    text.split_whitespace().count() >= SUMMARY_MIN_WORDS
        && text.matches('\n').count() <= SUMMARY_MAX_NEWLINES
        && !text.lines().any(|line| bullet_text(line.trim()).is_some())
}

/// Summary of current conditions, AI-written when possible
pub async fn summarize(
    reading: &WeatherReading,
    outlook: &DayOutlook,
    backend: &dyn ChatBackend,
    availability: &Availability,
) -> Generated<String> {
    let prompt = summary_prompt(reading, outlook);
    match ask(backend, availability, SUMMARY_SYSTEM_PROMPT, &prompt, "summary").await {
        Some(text) if is_paragraph(&text) => Generated::ai(text),
        Some(text) => {
            warn!(
                "LLM summary is not a paragraph ({} words), using template",
                text.split_whitespace().count()
            );
            Generated::fallback(template_summary(reading))
        }
        None => Generated::fallback(template_summary(reading)),
    }
}

/// Day outlook as an HTML fragment, AI-written when possible
pub async fn outlook_html(
    reading: &WeatherReading,
    outlook: &DayOutlook,
    backend: &dyn ChatBackend,
    availability: &Availability,
) -> Generated<String> {
    let text = if outlook.is_empty() {
        None
    } else {
        let prompt = outlook_prompt(reading, outlook);
        ask(backend, availability, OUTLOOK_SYSTEM_PROMPT, &prompt, "outlook").await
    };
    match text {
        Some(text) => Generated::ai(format_outlook_html(&text)),
        None => Generated::fallback(format_outlook_html(&template_outlook(reading, outlook))),
    }
}

/// Turn outlook text into a small HTML skeleton.
///
/// Header lines become `<h4>`, `-`/`*`/`•` lines become list items and
/// anything else a paragraph. Text that already carries markup is stripped
/// first, so only escaped text ends up in the output.
#[must_use]
pub fn format_outlook_html(text: &str) -> String {
    let plain = if has_markup(text) {
        strip_tags(text)
    } else {
        text.to_string()
    };

    let mut html = String::new();
    let mut in_list = false;

    for line in plain.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(item) = bullet_text(line) {
            if !in_list {
                html.push_str("<ul>");
                in_list = true;
            }
            html.push_str(&format!("<li>{}</li>", escape_html(item)));
            continue;
        }

        if in_list {
            html.push_str("</ul>");
            in_list = false;
        }

        match header_text(line) {
            Some(header) => html.push_str(&format!("<h4>{}</h4>", escape_html(header))),
            None => html.push_str(&format!("<p>{}</p>", escape_html(line))),
        }
    }

    if in_list {
        html.push_str("</ul>");
    }
    html
}

fn bullet_text(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let first = chars.next()?;
    if !matches!(first, '-' | '*' | '•') {
        return None;
    }
    let rest = chars.as_str();
    // "**bold**" is emphasis, not a bullet
    if first == '*' && rest.starts_with('*') {
        return None;
    }
    if rest.starts_with(char::is_whitespace) || first == '•' {
        let item = rest.trim();
        (!item.is_empty()).then_some(item)
    } else {
        None
    }
}

fn header_text(line: &str) -> Option<&str> {
    if line.starts_with('#') {
        let header = line.trim_start_matches('#').trim();
        return (!header.is_empty()).then_some(header);
    }
    if line.len() > 4 && line.starts_with("**") && line.ends_with("**") {
        return Some(line.trim_matches('*').trim());
    }
    if line.ends_with(':') && line.split_whitespace().count() <= 6 {
        return Some(line.trim_end_matches(':').trim());
    }
    None
}

/// Byte offset of the first `<` that opens a tag: followed by a letter or `/`
fn next_tag(text: &str) -> Option<usize> {
    text.match_indices('<').map(|(i, _)| i).find(|&i| {
        text[i + 1..]
            .chars()
            .next()
            .is_some_and(|n| n.is_ascii_alphabetic() || n == '/')
    })
}

fn has_markup(text: &str) -> bool {
    next_tag(text).is_some_and(|i| text[i..].contains('>'))
}

/// Drop tags while keeping the line structure they implied
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = next_tag(rest) {
        out.push_str(&rest[..start]);
        let Some(len) = rest[start..].find('>') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let tag = rest[start + 1..start + len].trim().to_ascii_lowercase();
        let closing = tag.starts_with('/');
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .collect();

        match (name.as_str(), closing) {
            ("li", false) => out.push_str("\n- "),
            ("h1" | "h2" | "h3" | "h4" | "h5" | "h6", false) => out.push_str("\n# "),
            ("br", _) => out.push('\n'),
            ("p" | "div" | "ul" | "ol" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6", _) => {
                out.push('\n');
            }
            _ => {}
        }
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);

    out.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ForecastPoint;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use rstest::rstest;
    use std::sync::Mutex;
    use std::time::Duration;

    struct ScriptedBackend {
        reply: AiReply,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(reply: AiReply) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn chat(&self, _system: &str, user: &str) -> AiReply {
            self.prompts.lock().unwrap().push(user.to_string());
            self.reply.clone()
        }

        async fn probe_health(&self, _timeout: Duration) -> crate::Result<u16> {
            Ok(200)
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    /// Points at the given UTC hours of `today`, evaluated in UTC
    fn reading_with(points: &[(u32, f64, &str)]) -> WeatherReading {
        let start = today().and_hms_opt(0, 0, 0).unwrap().and_utc();
        let forecast = points
            .iter()
            .map(|(hour, temp, conditions)| ForecastPoint {
                timestamp: start + ChronoDuration::hours(i64::from(*hour)),
                temperature: *temp,
                feels_like: *temp,
                conditions: (*conditions).to_string(),
            })
            .collect();
        WeatherReading::new(50.0, 48.0, "clouds", 5.0)
            .with_location("Springfield")
            .with_forecast(forecast)
    }

    #[test]
    fn test_template_summary_mentions_everything() {
        let reading = WeatherReading::new(71.6, 70.2, "clear", 3.0)
            .with_location("Manhattan")
            .with_time_of_day(TimeOfDay::Morning);
        assert_eq!(
            template_summary(&reading),
            "It's 72°F (feels like 70°F) with clear in Manhattan this morning."
        );
    }

    #[test]
    fn test_template_summary_at_night() {
        let reading =
            WeatherReading::new(30.0, 25.0, "snow", 3.0).with_time_of_day(TimeOfDay::Night);
        assert!(template_summary(&reading).ends_with("with snow tonight."));
    }

    #[test]
    fn test_segments_bucket_by_local_hour() {
        let reading = reading_with(&[
            (3, 30.0, "clear"),
            (6, 40.0, "clear"),
            (9, 44.0, "clouds"),
            (12, 50.0, "clouds"),
            (15, 54.0, "rain"),
            (21, 46.0, "rain"),
        ]);
        let outlook = DayOutlook::build(&reading, today(), &Utc);

        let names: Vec<Segment> = outlook.segments.iter().map(|s| s.segment).collect();
        assert_eq!(names, vec![Segment::Morning, Segment::Afternoon, Segment::Evening]);

        let morning = &outlook.segments[0];
        assert_eq!((morning.min, morning.max, morning.mean), (40.0, 44.0, 42.0));
        assert_eq!(morning.conditions, vec!["clear", "clouds"]);
        // 03:00 is before the morning segment
        assert!(outlook.segments.iter().all(|s| s.min >= 40.0));
    }

    #[test]
    fn test_points_on_other_days_are_ignored() {
        let reading = reading_with(&[(30, 70.0, "clear")]);
        assert!(DayOutlook::build(&reading, today(), &Utc).is_empty());
    }

    #[rstest]
    #[case(&[(9, 40.0, "clear"), (21, 44.0, "clear")], Trend::Rising)]
    #[case(&[(9, 40.0, "clear"), (21, 43.0, "clear")], Trend::Steady)]
    #[case(&[(9, 50.0, "clear"), (15, 60.0, "clear"), (21, 45.0, "clear")], Trend::Falling)]
    #[case(&[(9, 40.0, "clear"), (10, 70.0, "clear")], Trend::Steady)]
    #[case(&[], Trend::Steady)]
    fn test_trend(#[case] points: &[(u32, f64, &str)], #[case] expected: Trend) {
        let outlook = DayOutlook::build(&reading_with(points), today(), &Utc);
        assert_eq!(outlook.trend, expected);
    }

    #[test]
    fn test_template_outlook_lists_segments() {
        let reading = reading_with(&[(9, 40.0, "clear"), (15, 55.0, "clouds"), (16, 57.0, "rain")]);
        let outlook = DayOutlook::build(&reading, today(), &Utc);
        let text = template_outlook(&reading, &outlook);

        assert_eq!(
            text,
            "Today's outlook:\n\
             - Morning: around 40°F, clear\n\
             - Afternoon: 55°F to 57°F, clouds then rain\n\
             Temperatures climb as the day goes on."
        );
    }

    #[test]
    fn test_template_outlook_without_forecast() {
        let reading = reading_with(&[]);
        let outlook = DayOutlook::build(&reading, today(), &Utc);
        assert!(template_outlook(&reading, &outlook).contains("No more forecast data"));
    }

    #[test]
    fn test_summary_prompt_embeds_reading_and_segments() {
        let reading = reading_with(&[(9, 40.0, "clear"), (21, 50.0, "clear")]);
        let outlook = DayOutlook::build(&reading, today(), &Utc);
        let prompt = summary_prompt(&reading, &outlook);

        assert!(prompt.contains("\"location\": \"Springfield\""));
        assert!(prompt.contains("rising trend"));
        assert!(prompt.contains("\"segment\": \"evening\""));

        let empty = reading_with(&[]);
        let bare = summary_prompt(&empty, &DayOutlook::build(&empty, today(), &Utc));
        assert!(!bare.contains("Rest of the day"));
    }

    const PARAGRAPH: &str = "Crisp and sunny this morning, with a light breeze and plenty of \
sunshine until the evening.";

    #[tokio::test]
    async fn test_summarize_uses_ai_text_when_available() {
        let backend = ScriptedBackend::new(AiReply::Text(PARAGRAPH.into()));
        let reading = reading_with(&[]);
        let outlook = DayOutlook::build(&reading, today(), &Utc);

        let summary = summarize(&reading, &outlook, &backend, &Availability::fixed(true)).await;
        assert_eq!(summary, Generated::ai(PARAGRAPH.to_string()));
        assert_eq!(backend.calls(), 1);
    }

    #[rstest]
    #[case(AiReply::Unavailable)]
    #[case(AiReply::Malformed("empty response".into()))]
    #[case(AiReply::Text("Sunny.".into()))]
    #[case(AiReply::Text(
        "- Wear a warm coat over a sweater today\n- Bring gloves and a hat\n- Boots for the slush".into()
    ))]
    #[case(AiReply::Text(
        "Cold today.\nVery cold.\nBundle up well.\nStay inside if you can, it is freezing out there.".into()
    ))]
    #[tokio::test]
    async fn test_summarize_falls_back_to_template(#[case] reply: AiReply) {
        let backend = ScriptedBackend::new(reply);
        let reading = reading_with(&[]);
        let outlook = DayOutlook::build(&reading, today(), &Utc);

        let summary = summarize(&reading, &outlook, &backend, &Availability::fixed(true)).await;
        assert_eq!(summary, Generated::fallback(template_summary(&reading)));
    }

    #[rstest]
    #[case(PARAGRAPH, true)]
    #[case("Two lines are fine.\nThis one keeps going with a few more words to reach twelve.", true)]
    #[case("Too short to count as a summary.", false)]
    #[case("1. first thing to wear\n* second thing to wear\n- third thing to wear today", false)]
    fn test_is_paragraph(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_paragraph(text), expected);
    }

    #[tokio::test]
    async fn test_summarize_skips_backend_when_unavailable() {
        let backend = ScriptedBackend::new(AiReply::Text(PARAGRAPH.into()));
        let reading = reading_with(&[]);
        let outlook = DayOutlook::build(&reading, today(), &Utc);

        let summary = summarize(&reading, &outlook, &backend, &Availability::fixed(false)).await;
        assert_eq!(summary.value, template_summary(&reading));
        assert!(!summary.from_ai);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_outlook_html_from_ai_is_formatted() {
        let backend = ScriptedBackend::new(AiReply::Text(
            "Looking ahead:\n- Morning: chilly\n- Evening: <b>mild</b>\nEnjoy!".into(),
        ));
        let reading = reading_with(&[(9, 40.0, "clear")]);
        let outlook = DayOutlook::build(&reading, today(), &Utc);

        let html = outlook_html(&reading, &outlook, &backend, &Availability::fixed(true)).await;
        assert!(html.from_ai);
        assert_eq!(
            html.value,
            "<h4>Looking ahead</h4><ul><li>Morning: chilly</li><li>Evening: mild</li></ul><p>Enjoy!</p>"
        );
    }

    #[tokio::test]
    async fn test_outlook_html_without_segments_skips_ai() {
        let backend = ScriptedBackend::new(AiReply::Text("unused".into()));
        let reading = reading_with(&[]);
        let outlook = DayOutlook::build(&reading, today(), &Utc);

        let html = outlook_html(&reading, &outlook, &backend, &Availability::fixed(true)).await;
        assert!(!html.from_ai);
        assert!(html.value.starts_with("<h4>Today&#39;s outlook</h4><p>No more forecast data"));
        assert_eq!(backend.calls(), 0);
    }

    #[test]
    fn test_format_plain_text() {
        let html = format_outlook_html("## Tomorrow\n* warm\n• breezy\nThat's all\n\n- later");
        assert_eq!(
            html,
            "<h4>Tomorrow</h4><ul><li>warm</li><li>breezy</li></ul><p>That&#39;s all</p><ul><li>later</li></ul>"
        );
    }

    #[test]
    fn test_format_keeps_bold_lines_as_headers() {
        assert_eq!(format_outlook_html("**Evening**"), "<h4>Evening</h4>");
    }

    #[test]
    fn test_format_rebuilds_existing_markup() {
        let html = format_outlook_html(
            "<h3>Outlook</h3><ul><li>Cold &amp; windy</li><li onclick=\"x()\">Dry</li></ul><script>alert(1)</script>",
        );
        assert_eq!(
            html,
            "<h4>Outlook</h4><ul><li>Cold &amp; windy</li><li>Dry</li></ul><p>alert(1)</p>"
        );
    }

    #[test]
    fn test_format_escapes_comparison_signs() {
        assert_eq!(
            format_outlook_html("Highs < 50 & lows > 30"),
            "<p>Highs &lt; 50 &amp; lows &gt; 30</p>"
        );
    }

    #[test]
    fn test_format_keeps_stray_angle_bracket_next_to_markup() {
        assert_eq!(
            format_outlook_html("Highs < 50 and <b>warm</b> later"),
            "<p>Highs &lt; 50 and warm later</p>"
        );
        assert_eq!(
            format_outlook_html("<p>Lows <30 tonight</p>"),
            "<p>Lows &lt;30 tonight</p>"
        );
    }

    #[test]
    fn test_format_empty_text() {
        assert_eq!(format_outlook_html("  \n \n"), "");
    }
}
