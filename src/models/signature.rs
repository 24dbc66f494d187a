//! Time and key signatures for the conductor track

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature {
            numerator: 4,
            denominator: 4,
        }
    }
}

impl TimeSignature {
    /// Parse "N/D". The denominator must be a power of two because SMF
    /// stores it as an exponent.
    pub fn parse(s: &str) -> Option<TimeSignature> {
        let (num, den) = s.trim().split_once('/')?;
        let numerator: u8 = num.trim().parse().ok()?;
        let denominator: u8 = den.trim().parse().ok()?;

        if numerator == 0 || denominator == 0 || !denominator.is_power_of_two() {
            return None;
        }

        Some(TimeSignature {
            numerator,
            denominator,
        })
    }

    /// Denominator as a power of two (4 -> 2, 8 -> 3)
    pub fn denominator_power(&self) -> u8 {
        self.denominator.trailing_zeros() as u8
    }
}

/// Key signature as stored in SMF: signed count of sharps (negative = flats)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeySignature {
    pub sharps: i8,
    pub minor: bool,
}

impl KeySignature {
    /// Parse "C major", "A minor", "F# min", "Bb", "Am", "c#" (lowercase
    /// tonic without a mode means minor)
    pub fn parse(s: &str) -> Option<KeySignature> {
        let mut words = s.split(|c: char| c.is_whitespace() || c == '_').filter(|w| !w.is_empty());
        let mut tonic = words.next()?;
        let mode = words.next().map(|w| w.to_ascii_lowercase());
        if words.next().is_some() {
            return None;
        }

        let minor = match mode.as_deref() {
            Some("major") | Some("maj") => false,
            Some("minor") | Some("min") | Some("m") => true,
            Some(_) => return None,
            None => {
                if tonic.len() > 1 && tonic.ends_with('m') {
                    tonic = &tonic[..tonic.len() - 1];
                    true
                } else {
                    tonic.starts_with(|c: char| c.is_ascii_lowercase())
                }
            }
        };

        let mut fifths = tonic_fifths(tonic)?;
        if minor {
            // Relative major sits a minor third above
            fifths -= 3;
        }
        // Spell impossible keys (G# major) enharmonically
        if fifths > 7 {
            fifths -= 12;
        } else if fifths < -7 {
            fifths += 12;
        }

        Some(KeySignature {
            sharps: fifths as i8,
            minor,
        })
    }
}

/// Position of a tonic on the circle of fifths relative to C
fn tonic_fifths(tonic: &str) -> Option<i32> {
    let mut chars = tonic.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let base = match letter {
        'F' => -1,
        'C' => 0,
        'G' => 1,
        'D' => 2,
        'A' => 3,
        'E' => 4,
        'B' => 5,
        _ => return None,
    };

    chars.try_fold(base, |fifths, c| match c {
        '#' | 's' => Some(fifths + 7),
        'b' | '-' => Some(fifths - 7),
        _ => None,
    })
}
