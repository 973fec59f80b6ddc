use parking_lot::Mutex;
use std::sync::Arc;

use super::Output;
use crate::ctrl_surf::{
    data::{BackgroundColor, TextColor, TrackId},
    protocol::{xtouch_ext as protocol, StripContent},
    Error, Observable,
};

/// Two lines of 7 characters on a colored background.
///
/// Texts are stored as set. On the device, they are truncated to 7 chars
/// or padded with spaces and non-ASCII chars show as `?`.
pub struct ScribbleStrip {
    track: TrackId,
    top_text: Observable<Arc<str>>,
    bottom_text: Observable<Arc<str>>,
    top_text_color: Observable<TextColor>,
    bottom_text_color: Observable<TextColor>,
    background_color: Observable<BackgroundColor>,
    output: Arc<Output>,
    write_lock: Mutex<()>,
}

impl ScribbleStrip {
    pub const TEXT_LEN: usize = 7;

    pub(crate) fn new(track: TrackId, output: Arc<Output>) -> Self {
        Self {
            track,
            top_text: Observable::new("".into()),
            bottom_text: Observable::new("".into()),
            top_text_color: Observable::default(),
            bottom_text_color: Observable::default(),
            background_color: Observable::default(),
            output,
            write_lock: Mutex::new(()),
        }
    }

    pub fn track(&self) -> TrackId {
        self.track
    }

    pub fn top_text(&self) -> &Observable<Arc<str>> {
        &self.top_text
    }

    pub fn bottom_text(&self) -> &Observable<Arc<str>> {
        &self.bottom_text
    }

    pub fn top_text_color(&self) -> &Observable<TextColor> {
        &self.top_text_color
    }

    pub fn bottom_text_color(&self) -> &Observable<TextColor> {
        &self.bottom_text_color
    }

    pub fn background_color(&self) -> &Observable<BackgroundColor> {
        &self.background_color
    }

    pub fn set_top_text(&self, text: impl Into<Arc<str>>) -> Result<(), Error> {
        self.top_text.publish(text.into());
        self.write_state_to_device()
    }

    pub fn set_bottom_text(&self, text: impl Into<Arc<str>>) -> Result<(), Error> {
        self.bottom_text.publish(text.into());
        self.write_state_to_device()
    }

    pub fn set_top_text_color(&self, color: TextColor) -> Result<(), Error> {
        self.top_text_color.publish(color);
        self.write_state_to_device()
    }

    pub fn set_bottom_text_color(&self, color: TextColor) -> Result<(), Error> {
        self.bottom_text_color.publish(color);
        self.write_state_to_device()
    }

    pub fn set_background_color(&self, color: BackgroundColor) -> Result<(), Error> {
        self.background_color.publish(color);
        self.write_state_to_device()
    }

    /// Sends the whole strip as a single SysEx message.
    pub fn write_state_to_device(&self) -> Result<(), Error> {
        let _guard = self.write_lock.lock();

        let top_text = self.top_text.get();
        let bottom_text = self.bottom_text.get();
        let content = StripContent {
            top_text: &top_text,
            bottom_text: &bottom_text,
            top_text_color: self.top_text_color.get(),
            bottom_text_color: self.bottom_text_color.get(),
            background_color: self.background_color.get(),
        };

        self.output.send(protocol::scribble_strip(self.track, &content))
    }
}
