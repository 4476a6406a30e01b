//! Merging AI clothing suggestions with the standard table

use tracing::{debug, warn};

use crate::availability::Availability;
use crate::llm::{AiReply, ChatBackend, Generated};
use crate::models::{Category, Recommendation, WeatherReading};
use crate::rules::standard_recommendations;
use crate::summary::reading_json;

/// Replies with fewer non-empty lines are ignored
const MIN_AI_LINES: usize = 3;

const CLOTHING_SYSTEM_PROMPT: &str = "You are a practical assistant helping a parent decide what \
their kid should wear today. Use concise, everyday language.";

/// Prompt asking for one labeled item per line
#[must_use]
pub fn clothing_prompt(reading: &WeatherReading, safety: &[String]) -> String {
    let labels: Vec<&str> = Category::ORDER.iter().map(|c| c.label()).collect();
    format!(
        "Based on these weather conditions and safety considerations, which specific clothing \
items should someone wear? Put each item on its own line as `<emoji> <Category>: <item>`, \
where Category is one of: {}.\n\nWeather data:\n{}\n\nSafety considerations:\n{}\n\nClothing recommendations:",
        labels.join(", "),
        reading_json(reading),
        serde_json::to_string_pretty(safety).unwrap_or_default()
    )
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    if line.starts_with("**") {
        return line;
    }
    if let Some(rest) = line.strip_prefix(['-', '*', '•']) {
        return rest.trim_start();
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(['.', ')']) {
            return rest.trim_start();
        }
    }
    line
}

fn is_emoji_char(c: char) -> bool {
    !c.is_ascii() && !c.is_alphanumeric() && !c.is_whitespace()
}

/// Split a leading emoji cluster off the text
fn split_emoji(text: &str) -> (Option<&str>, &str) {
    let end = text
        .char_indices()
        .find(|(_, c)| !is_emoji_char(*c))
        .map_or(text.len(), |(i, _)| i);
    if end == 0 {
        (None, text)
    } else {
        (Some(&text[..end]), text[end..].trim_start())
    }
}

/// Parse one line of model output.
///
/// Returns `None` for lines that carry no item, such as intro lines ending
/// in a colon.
#[must_use]
pub fn parse_ai_line(line: &str) -> Option<Recommendation> {
    let text = strip_list_marker(line).replace("**", "");
    let (emoji, rest) = split_emoji(text.trim());

    let (category, item) = match rest.split_once(':') {
        Some((label, item)) => match Category::from_label(label) {
            Some(category) => (Some(category), item.trim()),
            None => (None, rest),
        },
        None => (None, rest),
    };

    let item = item.trim();
    if item.is_empty() || item.ends_with(':') {
        return None;
    }

    let category = category
        .or_else(|| Category::classify(item))
        .unwrap_or(Category::Accessories);

    Some(match emoji {
        Some(emoji) => Recommendation::new(category, emoji, item),
        None => Recommendation::plain(category, item),
    })
}

/// First-seen order by normalized key; a later duplicate only wins when it
/// brings an emoji the kept one lacks
fn dedup(candidates: impl IntoIterator<Item = Recommendation>) -> Vec<Recommendation> {
    let mut kept: Vec<Recommendation> = Vec::new();
    for candidate in candidates {
        let key = candidate.key();
        if key.is_empty() {
            continue;
        }
        match kept.iter_mut().find(|r| r.key() == key) {
            Some(existing) => {
                if !existing.has_emoji() && candidate.has_emoji() {
                    *existing = candidate;
                }
            }
            None => kept.push(candidate),
        }
    }
    kept
}

/// Stable sort into display order
#[must_use]
pub fn order_by_category(mut items: Vec<Recommendation>) -> Vec<Recommendation> {
    items.sort_by_key(|r| r.category.rank());
    items
}

/// Merge parsed AI items into the standard table output.
///
/// Essential categories keep one entry with the standard item first;
/// optional categories list AI items before standard ones.
#[must_use]
pub fn merge(standard: Vec<Recommendation>, ai: Vec<Recommendation>) -> Vec<Recommendation> {
    let mut merged = Vec::with_capacity(standard.len() + ai.len());

    for category in Category::ORDER {
        let from_standard = standard.iter().filter(|r| r.category == category).cloned();
        let from_ai = ai.iter().filter(|r| r.category == category).cloned();

        let mut items = if category.is_essential() {
            dedup(from_standard.chain(from_ai))
        } else {
            dedup(from_ai.chain(from_standard))
        };

        if category.is_essential() {
            items.truncate(1);
            if items.is_empty() {
                items.extend(Recommendation::default_for(category));
            }
        }
        merged.extend(items);
    }

    order_by_category(merged)
}

/// Merged list when the reply is usable, `None` when the standard table should stand alone
fn merge_reply(standard: &[Recommendation], reply: AiReply) -> Option<Vec<Recommendation>> {
    let text = match reply {
        AiReply::Text(text) => text,
        other => {
            debug!("No AI clothing text ({}), using standard table", other.kind());
            return None;
        }
    };

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() < MIN_AI_LINES {
        debug!("AI clothing reply has {} lines, using standard table", lines.len());
        return None;
    }

    let ai: Vec<Recommendation> = lines.into_iter().filter_map(parse_ai_line).collect();
    Some(merge(standard.to_vec(), ai))
}

/// Final clothing list for a reading given whatever the model returned
#[must_use]
pub fn reconcile(reading: &WeatherReading, reply: AiReply) -> Vec<Recommendation> {
    let standard = standard_recommendations(reading);
    merge_reply(&standard, reply).unwrap_or(standard)
}

/// Clothing recommendations, consulting the model when it is available
pub async fn recommend_clothing(
    reading: &WeatherReading,
    safety: &[String],
    backend: &dyn ChatBackend,
    availability: &Availability,
) -> Generated<Vec<Recommendation>> {
    let standard = standard_recommendations(reading);
    if !availability.is_available() {
        return Generated::fallback(standard);
    }

    let reply = backend
        .chat(CLOTHING_SYSTEM_PROMPT, &clothing_prompt(reading, safety))
        .await;
    if let AiReply::Malformed(reason) = &reply {
        warn!("LLM clothing reply unusable: {}", reason);
    }
    match merge_reply(&standard, reply) {
        Some(merged) => Generated::ai(merged),
        None => Generated::fallback(standard),
    }
}
