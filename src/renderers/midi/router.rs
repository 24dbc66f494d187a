//! Track routing
//!
//! Partitions the flat event list into tracks keyed by (instrument, channel).
//! Percussion always lands on channel 9; a melodic instrument declared on
//! channel 9 is moved to another channel according to the
//! [`ChannelSubstitution`] policy.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::defaults::{melodic_channel, melodic_channels, MELODIC_CHANNEL_COUNT, PERCUSSION_CHANNEL};
use crate::models::NoteEvent;
use crate::symbols::{is_percussion, normalize_name};

/// Identity of one output track
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackKey {
    pub instrument: String, // Normalized instrument name
    pub channel: u8,        // Effective channel
}

impl TrackKey {
    pub fn new(instrument: &str, channel: u8) -> Self {
        TrackKey {
            instrument: normalize_name(instrument),
            channel,
        }
    }
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.instrument, self.channel)
    }
}

/// How to pick a channel for a melodic instrument declared on channel 9
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelSubstitution {
    /// Lowest melodic channel not already claimed by another instrument
    #[default]
    LowestAvailable,
    /// Uniformly random melodic channel
    Random,
}

/// Events routed to one track, in their original relative order
#[derive(Debug, Clone)]
pub struct RoutedTrack<'a> {
    pub key: TrackKey,
    pub percussion: bool,
    pub events: Vec<&'a NoteEvent>,
}

/// Routing state for a single pass; never shared between passes
#[derive(Debug)]
pub struct TrackRouter {
    policy: ChannelSubstitution,
    claimed: HashMap<u8, String>,      // Melodic channel -> instrument that claimed it first
    substituted: HashMap<String, u8>,  // Instrument -> channel it was moved to
}

impl TrackRouter {
    pub fn new(policy: ChannelSubstitution) -> Self {
        TrackRouter {
            policy,
            claimed: HashMap::new(),
            substituted: HashMap::new(),
        }
    }

    /// Effective channel for one event
    pub fn effective_channel(&mut self, instrument: &str, declared: Option<u8>) -> u8 {
        if is_percussion(instrument) {
            return PERCUSSION_CHANNEL;
        }

        let declared = declared.unwrap_or_else(|| {
            log::warn!("Channel out of range for {}, using channel 0", instrument);
            0
        });

        let channel = if declared == PERCUSSION_CHANNEL {
            self.substitute(instrument)
        } else {
            declared
        };

        self.claimed.entry(channel).or_insert_with(|| instrument.to_string());
        channel
    }

    fn substitute(&mut self, instrument: &str) -> u8 {
        if let Some(channel) = self.substituted.get(instrument) {
            return *channel;
        }

        let channel = match self.policy {
            ChannelSubstitution::LowestAvailable => self.lowest_available(instrument),
            ChannelSubstitution::Random => random_melodic_channel().unwrap_or_else(|| {
                log::warn!("No entropy available, falling back to lowest free channel");
                self.lowest_available(instrument)
            }),
        };

        log::debug!(
            "{} declared on percussion channel {}, moved to channel {}",
            instrument,
            PERCUSSION_CHANNEL,
            channel
        );
        self.substituted.insert(instrument.to_string(), channel);
        channel
    }

    fn lowest_available(&self, instrument: &str) -> u8 {
        melodic_channels()
            .find(|channel| match self.claimed.get(channel) {
                None => true,
                Some(owner) => owner == instrument,
            })
            .unwrap_or_else(|| melodic_channel(0))
    }

    /// Group events into tracks in order of first appearance
    pub fn route<'a>(mut self, events: &'a [NoteEvent]) -> Vec<RoutedTrack<'a>> {
        let mut tracks: Vec<RoutedTrack<'a>> = Vec::new();
        let mut index: HashMap<TrackKey, usize> = HashMap::new();

        for event in events {
            let instrument = normalize_name(&event.instrument);
            let channel = self.effective_channel(&instrument, event.declared_channel());
            let key = TrackKey {
                instrument,
                channel,
            };

            let slot = *index.entry(key.clone()).or_insert_with(|| {
                tracks.push(RoutedTrack {
                    percussion: channel == PERCUSSION_CHANNEL,
                    key,
                    events: Vec::new(),
                });
                tracks.len() - 1
            });
            tracks[slot].events.push(event);
        }

        tracks
    }
}

/// Route `events` with a fresh router
pub fn route(events: &[NoteEvent], policy: ChannelSubstitution) -> Vec<RoutedTrack<'_>> {
    TrackRouter::new(policy).route(events)
}

fn random_melodic_channel() -> Option<u8> {
    let mut bytes = [0u8; 4];
    getrandom::getrandom(&mut bytes).ok()?;
    let index = u32::from_le_bytes(bytes) as usize % MELODIC_CHANNEL_COUNT;
    Some(melodic_channel(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(instrument: &str, channel: i64) -> NoteEvent {
        let mut event = NoteEvent::note("C4");
        event.instrument = instrument.to_string();
        event.channel = channel;
        event
    }

    #[test]
    fn test_track_key_display() {
        assert_eq!(TrackKey::new("Acoustic Grand", 0).to_string(), "acoustic_grand_0");
        assert_eq!(TrackKey::new("kick", 9).to_string(), "kick_9");
    }

    #[test]
    fn test_percussion_forced_to_channel_nine() {
        let events = vec![event("kick", 3)];
        let tracks = route(&events, ChannelSubstitution::LowestAvailable);

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].key.channel, PERCUSSION_CHANNEL);
        assert!(tracks[0].percussion);
    }

    #[test]
    fn test_collision_lowest_available() {
        let events = vec![event("violin", 0), event("flute", 1), event("cello", 9)];
        let tracks = route(&events, ChannelSubstitution::LowestAvailable);

        assert_eq!(tracks[2].key, TrackKey::new("cello", 2));
        assert!(!tracks[2].percussion);
    }

    #[test]
    fn test_collision_reuses_substitution() {
        let events = vec![event("cello", 9), event("violin", 0), event("cello", 9)];
        let tracks = route(&events, ChannelSubstitution::LowestAvailable);

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].key.channel, 0);
        assert_eq!(tracks[0].events.len(), 2);
        // violin keeps its declared channel and shares it
        assert_eq!(tracks[1].key, TrackKey::new("violin", 0));
    }

    #[test]
    fn test_collision_random_is_melodic() {
        for _ in 0..32 {
            let events = vec![event("trumpet", 9)];
            let tracks = route(&events, ChannelSubstitution::Random);
            let channel = tracks[0].key.channel;
            assert!(channel <= 15 && channel != PERCUSSION_CHANNEL, "got {}", channel);
        }
    }

    #[test]
    fn test_all_channels_claimed_falls_back() {
        let mut events: Vec<NoteEvent> = melodic_channels()
            .map(|channel| event(&format!("inst{}", channel), channel as i64))
            .collect();
        events.push(event("cello", 9));
        let tracks = route(&events, ChannelSubstitution::LowestAvailable);

        assert_eq!(tracks.last().map(|t| t.key.channel), Some(0));
    }

    #[test]
    fn test_first_appearance_order_and_grouping() {
        let events = vec![
            event("piano", 0),
            event("snare", 0),
            event("Piano", 0),
            event("bass", 1),
        ];
        let tracks = route(&events, ChannelSubstitution::LowestAvailable);
        let keys: Vec<String> = tracks.iter().map(|t| t.key.to_string()).collect();

        assert_eq!(keys, vec!["piano_0", "snare_9", "bass_1"]);
        assert_eq!(tracks[0].events.len(), 2);
    }

    #[test]
    fn test_out_of_range_channel() {
        let events = vec![event("piano", 42)];
        let tracks = route(&events, ChannelSubstitution::LowestAvailable);
        assert_eq!(tracks[0].key.channel, 0);
    }
}
