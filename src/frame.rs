/// One discrete step of an algorithm's execution.
pub type Frame = u32;

/// The frames at which a primitive was created, destroyed and selected.
///
/// `last` stays `None` while the primitive is live. When a build finishes,
/// every open lifetime is closed at the final frame, so primitives of the
/// final hull are exactly those with `last == Some(final_frame)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Lifetime {
    /// The frame at which the primitive was created.
    pub first: Frame,
    /// The frame at which the primitive was destroyed.
    pub last: Option<Frame>,
    /// The frame at which the primitive was picked as the pivot of a step.
    pub selected: Option<Frame>,
}

impl Lifetime {
    /// A live lifetime starting at `first`.
    #[inline]
    pub const fn new(first: Frame) -> Self {
        Self {
            first,
            last: None,
            selected: None,
        }
    }

    /// A lifetime that begins and ends at the same frame.
    #[inline]
    pub const fn instant(frame: Frame) -> Self {
        Self {
            first: frame,
            last: Some(frame),
            selected: None,
        }
    }

    /// Returns `true` if the primitive has not been destroyed.
    #[inline]
    pub const fn is_live(&self) -> bool {
        self.last.is_none()
    }

    /// Marks the primitive as destroyed at `frame`.
    ///
    /// # Panics
    ///
    /// Panics with `debug_assertions` enabled if the primitive is already dead
    /// or if `frame` precedes its creation.
    #[inline]
    pub fn kill(&mut self, frame: Frame) {
        debug_assert!(self.last.is_none(), "primitive killed twice");
        debug_assert!(self.first <= frame, "primitive killed before it was created");
        self.last = Some(frame);
    }

    /// Records that the primitive was selected at `frame`.
    #[inline]
    pub fn select(&mut self, frame: Frame) {
        debug_assert!(self.selected.is_none(), "primitive selected twice");
        self.selected = Some(frame);
    }

    /// Closes an open lifetime at `frame`.
    #[inline]
    pub(crate) fn close(&mut self, frame: Frame) {
        if self.last.is_none() {
            self.last = Some(frame);
        }
    }

    /// Returns `true` if the primitive exists at `frame`.
    ///
    /// An open lifetime is visible at every frame from its creation on.
    #[inline]
    pub fn visible(&self, frame: Frame) -> bool {
        self.first <= frame && self.last.is_none_or(|last| frame <= last)
    }
}

/// A value carrying a [`Lifetime`].
pub trait FrameStamped {
    /// Returns the lifetime of the value.
    fn lifetime(&self) -> &Lifetime;

    /// The frame at which the value was created.
    #[inline]
    fn first_frame(&self) -> Frame {
        self.lifetime().first
    }

    /// The frame at which the value was destroyed, if any.
    #[inline]
    fn last_frame(&self) -> Option<Frame> {
        self.lifetime().last
    }

    /// The frame at which the value was selected, if any.
    #[inline]
    fn select_frame(&self) -> Option<Frame> {
        self.lifetime().selected
    }

    /// Returns `true` if the value exists at `frame`.
    #[inline]
    fn visible(&self, frame: Frame) -> bool {
        self.lifetime().visible(frame)
    }
}

impl FrameStamped for Lifetime {
    #[inline]
    fn lifetime(&self) -> &Lifetime {
        self
    }
}

/// The frame used to order primitives when sorting a history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKey {
    /// Order by creation frame.
    First,
    /// Order by destruction frame. Live primitives sort last.
    Last,
    /// Order by selection frame. Unselected primitives sort first.
    Select,
}

impl FrameKey {
    pub(crate) fn key(self, lifetime: &Lifetime) -> (Frame, bool) {
        match self {
            FrameKey::First => (lifetime.first, false),
            FrameKey::Last => match lifetime.last {
                Some(last) => (last, false),
                None => (Frame::MAX, true),
            },
            FrameKey::Select => match lifetime.selected {
                Some(selected) => (selected, true),
                None => (0, false),
            },
        }
    }
}
