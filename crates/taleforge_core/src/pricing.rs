//! Fixed credit pricing policy.
//!
//! The pricing table is policy, not configuration: text segments cost 2
//! credits, images 1, audio 1 base credit covering the first 100 words of
//! narration plus 1 per additional started block of 100 words. Video is
//! priced by its adapter's quote. Every billable artifact charges at least
//! 1 credit.

use crate::ArtifactKind;

/// Credits charged for one narrative text segment.
pub const TEXT_CREDITS: u32 = 2;

/// Credits charged for one illustration image.
pub const IMAGE_CREDITS: u32 = 1;

/// Base credits for an audio track, covering the first word block.
pub const AUDIO_BASE_CREDITS: u32 = 1;

/// Narration words covered per audio credit block.
pub const AUDIO_WORDS_PER_CREDIT: u32 = 100;

/// Minimum charge per billable artifact.
pub const MIN_CHARGE_CREDITS: u32 = 1;

/// Credits for an audio narration of the given word count.
///
/// The base credit covers the first 100 words; each additional started block
/// of 100 words adds one credit.
///
/// # Examples
///
/// ```
/// use taleforge_core::audio_credits;
///
/// assert_eq!(audio_credits(0), 1);
/// assert_eq!(audio_credits(50), 1);
/// assert_eq!(audio_credits(100), 1);
/// assert_eq!(audio_credits(101), 2);
/// assert_eq!(audio_credits(250), 3);
/// ```
pub fn audio_credits(narration_words: u32) -> u32 {
    let surcharge = narration_words
        .saturating_sub(AUDIO_WORDS_PER_CREDIT)
        .div_ceil(AUDIO_WORDS_PER_CREDIT);
    (AUDIO_BASE_CREDITS + surcharge).max(MIN_CHARGE_CREDITS)
}

/// Fixed credit cost for a kind, where one exists.
///
/// Audio depends on narration length and video on the adapter's own quote,
/// so both return `None` here; adapters resolve those through
/// `ProviderAdapter::quote`.
pub fn base_credits(kind: ArtifactKind) -> Option<u32> {
    match kind {
        ArtifactKind::Text => Some(TEXT_CREDITS),
        ArtifactKind::Image => Some(IMAGE_CREDITS),
        ArtifactKind::Audio | ArtifactKind::Video => None,
    }
}
