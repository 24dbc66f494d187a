//! Serde deserialization helpers for loosely-typed description JSON
//!
//! Descriptions come from a text generator, so numbers arrive as floats,
//! pitches arrive as numbers, and "no effects" has several spellings.

use serde::{Deserialize, Deserializer};

use super::description::Effect;

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => match n.as_f64() {
                // 60.0 should read as "60", not "60.0"
                Some(f) if f.fract() == 0.0 => format!("{}", f as i64),
                _ => n.to_string(),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<StringOrNumber>),
    One(StringOrNumber),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EffectsField {
    List(Vec<Effect>),
    Text(String),
}

/// Accept an integer written as any JSON number (64 or 64.0), rounding floats
pub fn lenient_integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("expected a finite number"));
    }
    Ok(value.round() as i64)
}

/// Accept a pitch given as a string ("C4") or a bare number (60)
pub fn pitch_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(value.map(StringOrNumber::into_string))
}

/// Accept a pitch list as an array, a single string, or null
pub fn pitch_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<OneOrMany>::deserialize(deserializer)?;
    Ok(match value {
        None => Vec::new(),
        Some(OneOrMany::One(item)) => vec![item.into_string()],
        Some(OneOrMany::Many(items)) => items.into_iter().map(StringOrNumber::into_string).collect(),
    })
}

/// Normalize the effects field: absent, null, empty or a string such as
/// "none" all mean no effects
pub fn effects_list<'de, D>(deserializer: D) -> Result<Vec<Effect>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<EffectsField>::deserialize(deserializer)?;
    Ok(match value {
        Some(EffectsField::List(effects)) => effects,
        Some(EffectsField::Text(text)) => {
            if !text.trim().eq_ignore_ascii_case("none") && !text.trim().is_empty() {
                log::debug!("Ignoring non-list effects value {:?}", text);
            }
            Vec::new()
        }
        None => Vec::new(),
    })
}
