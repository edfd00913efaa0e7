// Frame differ - Skips redundant work on unchanged frames
//
// The emulated machine redraws an unchanged screen most of the time. The
// differ keeps a copy of the last frame that was passed downstream and
// reports whether the new frame is different.

/// Result of comparing a frame against the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameChange {
    /// Byte-identical to the previous frame
    Unchanged,
    /// Different, or there is no previous frame
    Changed,
}

impl FrameChange {
    pub fn is_changed(self) -> bool {
        self == FrameChange::Changed
    }
}

/// Holds the previous frame
#[derive(Debug, Default)]
pub struct FrameDiffer {
    /// Empty before the first frame and after `invalidate`
    previous: Vec<u8>,
}

impl FrameDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `frame` with the previous frame, remembering it when changed
    pub fn compare(&mut self, frame: &[u8]) -> FrameChange {
        if self.previous.as_slice() == frame {
            return FrameChange::Unchanged;
        }

        self.previous.clear();
        self.previous.extend_from_slice(frame);
        FrameChange::Changed
    }

    /// Forget the previous frame so the next comparison reports a change
    pub fn invalidate(&mut self) {
        self.previous.clear();
    }

    /// Release the previous-frame storage
    pub fn release(&mut self) {
        self.previous = Vec::new();
    }

    /// The previous frame (empty before the first comparison)
    pub fn previous(&self) -> &[u8] {
        &self.previous
    }
}
