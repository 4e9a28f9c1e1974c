/// Modifier keys held during a pointer update.
///
/// The UI layer maps its own key bindings onto these flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierState {
    /// Restrict motion to one axis (strafing).
    pub axis_lock: bool,
    /// Move only the grabbed element and let its segments reorient.
    pub free_rotation: bool,
    /// Flip the push mode of a slide for this frame.
    pub invert_push_mode: bool,
    /// Skip snapping and easing.
    pub snap_disabled: bool,
}

impl ModifierState {
    #[must_use]
    pub fn axis_locked() -> Self {
        Self {
            axis_lock: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn free() -> Self {
        Self {
            free_rotation: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn without_snapping(mut self) -> Self {
        self.snap_disabled = true;
        self
    }
}
