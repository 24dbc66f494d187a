//! Description-to-score sequencing
//!
//! Converts a [`MusicDescription`] into a [`SequencedScore`]: routes events
//! into tracks, resolves names to codes, expands pitch-wheel modulation and
//! delta-encodes every track against its own running cursor.
//!
//! Each call builds its own router and track state, so concurrent callers
//! never share cursors.

use super::defaults::{DEFAULT_TPQ, MAX_TPQ};
use super::model::{beats_to_ticks, ChannelMessage, SequencedScore, SequencedTrack, TimedEvent};
use super::modulation::{expand_ramp, expand_vibrato, WheelPoint};
use super::router::{ChannelSubstitution, RoutedTrack, TrackRouter};
use crate::error::{ConfigError, Result};
use crate::models::{EventKind, MusicDescription, NoteEvent};
use crate::symbols::percussion::resolve_kit_voices;
use crate::symbols::{resolve_controller, resolve_instrument, resolve_percussion, resolve_pitch};

/// Largest delta an SMF variable-length quantity can hold
const MAX_DELTA: u64 = 0x0FFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerOptions {
    pub ticks_per_beat: u16,
    pub channel_substitution: ChannelSubstitution,
}

impl Default for SequencerOptions {
    fn default() -> Self {
        SequencerOptions {
            ticks_per_beat: DEFAULT_TPQ,
            channel_substitution: ChannelSubstitution::default(),
        }
    }
}

impl SequencerOptions {
    /// Resolution must fit the SMF header division
    pub fn validate(&self) -> Result<()> {
        if self.ticks_per_beat == 0 || self.ticks_per_beat > MAX_TPQ {
            return Err(ConfigError::Invalid(format!(
                "ticks_per_beat must be in 1..={}, got {}",
                MAX_TPQ, self.ticks_per_beat
            ))
            .into());
        }
        Ok(())
    }
}

/// What happened to the input events during one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceReport {
    pub events_total: usize,
    pub events_sequenced: usize,
    pub events_skipped: usize,
    pub effects_dropped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sequenced {
    pub score: SequencedScore,
    pub report: SequenceReport,
}

/// One track's events scheduled on its absolute timeline
struct TrackTimeline {
    scheduled: Vec<(u64, ChannelMessage)>,
    voice_selected: bool,
}

impl TrackTimeline {
    fn new() -> Self {
        TrackTimeline {
            scheduled: Vec::new(),
            voice_selected: false,
        }
    }

    fn push(&mut self, tick: u64, message: ChannelMessage) {
        self.scheduled.push((tick, message));
    }

    /// Order by tick (ties keep scheduling order) and delta-encode against a
    /// running cursor; deltas are never negative
    fn into_events(mut self) -> Vec<TimedEvent> {
        self.scheduled.sort_by_key(|(tick, _)| *tick);

        let mut cursor = 0u64;
        self.scheduled
            .into_iter()
            .map(|(tick, message)| {
                let delta = tick.saturating_sub(cursor).min(MAX_DELTA) as u32;
                cursor = cursor.max(tick);
                TimedEvent { delta, message }
            })
            .collect()
    }
}

/// Convert a description to a multi-track score
///
/// # Arguments
/// * `description` - Parsed description (tempo must be positive)
/// * `options` - Resolution and channel-substitution policy
///
/// # Returns
/// The score plus a report of skipped events and dropped effects
pub fn sequence(description: &MusicDescription, options: &SequencerOptions) -> Result<Sequenced> {
    description.validate()?;
    options.validate()?;

    let mut report = SequenceReport {
        events_total: description.notes.len(),
        ..SequenceReport::default()
    };

    let routed = TrackRouter::new(options.channel_substitution).route(&description.notes);

    let mut tracks = Vec::with_capacity(routed.len());
    for routed_track in routed {
        if let Some(track) = sequence_track(routed_track, options.ticks_per_beat, &mut report) {
            tracks.push(track);
        }
    }

    report.events_skipped = report.events_total - report.events_sequenced;
    if report.events_skipped > 0 {
        log::warn!(
            "Sequenced {} of {} events ({} skipped)",
            report.events_sequenced,
            report.events_total,
            report.events_skipped
        );
    }

    Ok(Sequenced {
        score: SequencedScore {
            ticks_per_beat: options.ticks_per_beat,
            tempo_bpm: description.tempo,
            time_signature: description.time_signature(),
            key_signature: description.key_signature(),
            tracks,
        },
        report,
    })
}

/// Sequence one routed track; None when none of its events survived
fn sequence_track(
    mut routed: RoutedTrack<'_>,
    ticks_per_beat: u16,
    report: &mut SequenceReport,
) -> Option<SequencedTrack> {
    // Stable: events at the same offset keep their original order
    routed
        .events
        .sort_by(|a, b| a.offset_beats().total_cmp(&b.offset_beats()));

    let mut timeline = TrackTimeline::new();
    for event in &routed.events {
        if schedule_event(&routed, event, ticks_per_beat, &mut timeline, report) {
            report.events_sequenced += 1;
        }
    }

    if !timeline.voice_selected {
        log::debug!("Track {} has no playable events, dropping it", routed.key);
        return None;
    }

    Some(SequencedTrack {
        key: routed.key,
        percussion: routed.percussion,
        events: timeline.into_events(),
    })
}

/// Note numbers for an event on this track; empty means skip
fn resolve_keys(routed: &RoutedTrack<'_>, event: &NoteEvent) -> Vec<u8> {
    if !routed.percussion {
        return event.pitch_input().map(resolve_pitch).unwrap_or_default();
    }

    // A track named after a single voice plays that voice; a kit track
    // names its voices per event
    match resolve_percussion(&routed.key.instrument) {
        Some(key) => vec![key],
        None => event.pitch_input().map(resolve_kit_voices).unwrap_or_default(),
    }
}

/// Schedule one event's messages; false when the event was skipped
fn schedule_event(
    routed: &RoutedTrack<'_>,
    event: &NoteEvent,
    ticks_per_beat: u16,
    timeline: &mut TrackTimeline,
    report: &mut SequenceReport,
) -> bool {
    if event.kind == EventKind::Unknown {
        log::warn!("Skipping event with unknown type on track {}", routed.key);
        return false;
    }

    let keys = resolve_keys(routed, event);
    if keys.is_empty() {
        if routed.percussion {
            log::warn!(
                "Skipping unknown percussion voice {:?} on track {}",
                event.pitch_input(),
                routed.key
            );
        } else {
            log::warn!(
                "Skipping unparseable pitch {:?} on track {}",
                event.pitch_input(),
                routed.key
            );
        }
        return false;
    }

    if !timeline.voice_selected {
        if !routed.percussion {
            let program = resolve_instrument(&routed.key.instrument);
            timeline.push(0, ChannelMessage::ProgramChange { program });
        }
        timeline.voice_selected = true;
    }

    let start = beats_to_ticks(event.offset_beats(), ticks_per_beat);
    let duration = beats_to_ticks(event.duration_beats(), ticks_per_beat);

    for effect in &event.effects {
        match resolve_controller(&effect.kind) {
            Some(controller) => timeline.push(
                start,
                ChannelMessage::ControlChange {
                    controller,
                    value: effect.value(),
                },
            ),
            None => {
                log::debug!("Dropping unknown effect {:?}", effect.kind);
                report.effects_dropped += 1;
            }
        }
    }

    let total_ticks = duration.min(u32::MAX as u64) as u32;
    let wheel: Option<Vec<WheelPoint>> = match (&event.pitch_bend, &event.vibrato) {
        (Some(bend), _) => Some(expand_ramp(bend.start, bend.end, bend.steps, total_ticks)),
        (None, Some(vibrato)) => Some(expand_vibrato(
            vibrato.depth,
            vibrato.speed,
            vibrato.steps,
            total_ticks,
        )),
        (None, None) => None,
    };
    if event.pitch_bend.is_some() && event.vibrato.is_some() {
        log::debug!("Event has both pitch bend and vibrato; using the pitch bend");
    }

    if let Some(points) = wheel {
        let mut tick = start;
        for (delta, value) in points {
            tick += delta as u64;
            timeline.push(tick, ChannelMessage::PitchBend { value });
        }
    }

    let velocity = event.velocity();
    for key in &keys {
        timeline.push(start, ChannelMessage::NoteOn { key: *key, velocity });
    }
    for key in &keys {
        timeline.push(start + duration, ChannelMessage::NoteOff { key: *key });
    }

    true
}
