//! Default values for MIDI export
//!
//! Provides the resolution and channel-assignment rules shared by the router
//! and the sequencer.

/// Default ticks per quarter note (MIDI resolution)
/// 480 is standard and provides good resolution
pub const DEFAULT_TPQ: u16 = 480;

/// Largest metrical division the 15-bit SMF header field can hold
pub const MAX_TPQ: u16 = 0x7FFF;

/// Channel 9 (10 in 1-indexed) is reserved for drums
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Number of channels that may carry melodic instruments
pub const MELODIC_CHANNEL_COUNT: usize = 15;

/// Map an index onto the melodic channels
/// - Channels 0-15 are available
/// - Skip channel 9 for melodic instruments
/// - Indices past the last melodic channel wrap around
pub fn melodic_channel(index: usize) -> u8 {
    let channel = index % MELODIC_CHANNEL_COUNT;
    if channel >= PERCUSSION_CHANNEL as usize {
        // Skip channel 9 (drums), map 9→10, 10→11, etc.
        (channel + 1) as u8
    } else {
        channel as u8
    }
}

/// Melodic channels in ascending order
pub fn melodic_channels() -> impl Iterator<Item = u8> {
    (0..MELODIC_CHANNEL_COUNT).map(melodic_channel)
}
