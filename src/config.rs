use crate::error::{ConfigError, Result};
use crate::math::easing::Easing;
use crate::math::Axis;

/// Tunable distances used by the interactive engine.
///
/// All values are in diagram units. The defaults match a drawing grid where
/// symbols and parallel wires sit one standard gap apart.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    standard_gap: f64,
    snap_radius: f64,
    ease_radius: f64,
    snap_jump: f64,
    interaction_radius: f64,
    min_segment_length: f64,
    crossing_clearance: f64,
    tie_tolerance: f64,
    standard_axes: Vec<Axis>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            standard_gap: 30.0,
            snap_radius: 4.0,
            ease_radius: 16.0,
            snap_jump: 2.0,
            interaction_radius: 10.0,
            min_segment_length: 5.0,
            crossing_clearance: 6.0,
            tie_tolerance: 0.01,
            standard_axes: vec![
                Axis::HORIZONTAL,
                Axis::VERTICAL,
                Axis::DIAGONAL,
                Axis::ANTI_DIAGONAL,
            ],
        }
    }
}

impl EditorConfig {
    /// Creates a configuration with the given standard gap and default radii.
    ///
    /// # Errors
    ///
    /// Returns an error if `standard_gap` is not a positive finite number.
    pub fn new(standard_gap: f64) -> Result<Self> {
        positive("standard gap", standard_gap)?;
        Ok(Self {
            standard_gap,
            ..Self::default()
        })
    }

    /// Replaces the snapping radii.
    ///
    /// # Errors
    ///
    /// Returns an error unless `0 < snap_radius < ease_radius` and
    /// `0 <= snap_jump <= snap_radius`.
    pub fn with_snap(mut self, snap_radius: f64, ease_radius: f64, snap_jump: f64) -> Result<Self> {
        positive("snap radius", snap_radius)?;
        positive("ease radius", ease_radius)?;
        if snap_radius >= ease_radius {
            return Err(ConfigError::InvalidParameters(
                "snap radius must be smaller than ease radius".to_owned(),
            )
            .into());
        }
        if !(0.0..=snap_radius).contains(&snap_jump) {
            return Err(ConfigError::InvalidParameters(
                "snap jump must lie within [0, snap radius]".to_owned(),
            )
            .into());
        }
        self.snap_radius = snap_radius;
        self.ease_radius = ease_radius;
        self.snap_jump = snap_jump;
        Ok(self)
    }

    /// Replaces the hit-testing radius.
    ///
    /// # Errors
    ///
    /// Returns an error if `radius` is not a positive finite number.
    pub fn with_interaction_radius(mut self, radius: f64) -> Result<Self> {
        positive("interaction radius", radius)?;
        self.interaction_radius = radius;
        Ok(self)
    }

    /// Replaces the minimum length a drawn segment must reach to be committed.
    ///
    /// # Errors
    ///
    /// Returns an error if `length` is not a positive finite number.
    pub fn with_min_segment_length(mut self, length: f64) -> Result<Self> {
        positive("minimum segment length", length)?;
        self.min_segment_length = length;
        Ok(self)
    }

    /// Replaces the distance below which crossings near endpoints are hidden.
    ///
    /// # Errors
    ///
    /// Returns an error if `clearance` is negative or not finite.
    pub fn with_crossing_clearance(mut self, clearance: f64) -> Result<Self> {
        if !clearance.is_finite() || clearance < 0.0 {
            return Err(ConfigError::InvalidParameters(
                "crossing clearance must be non-negative".to_owned(),
            )
            .into());
        }
        self.crossing_clearance = clearance;
        Ok(self)
    }

    /// Replaces the set of axes a freely rotated line is eased toward.
    ///
    /// # Errors
    ///
    /// Returns an error if `axes` is empty.
    pub fn with_standard_axes(mut self, axes: Vec<Axis>) -> Result<Self> {
        if axes.is_empty() {
            return Err(
                ConfigError::InvalidParameters("at least one standard axis required".to_owned())
                    .into(),
            );
        }
        self.standard_axes = axes;
        Ok(self)
    }

    /// Returns the spacing sliding and gap snapping try to maintain.
    #[must_use]
    pub fn standard_gap(&self) -> f64 {
        self.standard_gap
    }

    /// Returns the distance inside which a candidate jumps onto its target.
    #[must_use]
    pub fn snap_radius(&self) -> f64 {
        self.snap_radius
    }

    /// Returns the distance inside which a candidate is eased toward its target.
    #[must_use]
    pub fn ease_radius(&self) -> f64 {
        self.ease_radius
    }

    /// Returns the pull applied exactly at the snap radius.
    #[must_use]
    pub fn snap_jump(&self) -> f64 {
        self.snap_jump
    }

    #[must_use]
    pub fn interaction_radius(&self) -> f64 {
        self.interaction_radius
    }

    #[must_use]
    pub fn min_segment_length(&self) -> f64 {
        self.min_segment_length
    }

    #[must_use]
    pub fn crossing_clearance(&self) -> f64 {
        self.crossing_clearance
    }

    /// Returns the distance under which two snap candidates count as tied.
    #[must_use]
    pub fn tie_tolerance(&self) -> f64 {
        self.tie_tolerance
    }

    #[must_use]
    pub fn standard_axes(&self) -> &[Axis] {
        &self.standard_axes
    }

    /// Returns the easing curve built from the snap radii.
    #[must_use]
    pub fn easing(&self) -> Easing {
        Easing::new(self.snap_radius, self.ease_radius, self.snap_jump)
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameters(format!("{name} must be positive, got {value}")).into())
    }
}
