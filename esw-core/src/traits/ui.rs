//! Rendering collaborator

use crate::clock::WallTime;

/// Trait for the watch face and message area
///
/// Layout, scrolling and time formatting belong to the implementation.
pub trait Ui {
    /// Show `text` in the scrollable message area
    fn present(&mut self, text: &str);

    /// Show or hide the recording indicator
    fn set_recording_indicator(&mut self, visible: bool);

    /// Short vibration pulse
    fn vibrate_short(&mut self);

    /// Refresh the digital clock
    fn show_time(&mut self, time: WallTime);
}
