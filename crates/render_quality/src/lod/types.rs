use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Host-side identity of a tracked object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// Host-side identity of one drawable detail variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepresentationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LodHandle(pub(crate) u64);

impl LodHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodLevel {
    /// Camera distance at which this level starts to apply, before scaling.
    pub threshold: f32,
    pub representation: RepresentationId,
}

impl LodLevel {
    pub fn new(threshold: f32, representation: RepresentationId) -> Self {
        Self {
            threshold,
            representation,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LodError {
    #[error("object {object:?} registered without detail levels")]
    NoLevels { object: ObjectId },
    #[error("object {object:?} level {index} has invalid threshold {threshold}")]
    InvalidThreshold {
        object: ObjectId,
        index: usize,
        threshold: f32,
    },
    #[error(
        "object {object:?} level {index} threshold {threshold} is below previous threshold {previous}"
    )]
    NotAscending {
        object: ObjectId,
        index: usize,
        threshold: f32,
        previous: f32,
    },
}

pub(crate) fn validate_levels(object: ObjectId, levels: &[LodLevel]) -> Result<(), LodError> {
    if levels.is_empty() {
        return Err(LodError::NoLevels { object });
    }

    let mut previous: Option<f32> = None;
    for (index, level) in levels.iter().enumerate() {
        let threshold = level.threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(LodError::InvalidThreshold {
                object,
                index,
                threshold,
            });
        }
        if let Some(previous) = previous {
            if threshold < previous {
                return Err(LodError::NotAscending {
                    object,
                    index,
                    threshold,
                    previous,
                });
            }
        }
        previous = Some(threshold);
    }
    Ok(())
}

/// Level index for `distance` once every threshold is scaled by `multiplier`.
///
/// Level `i` covers `[t_i, t_{i+1})`; past the last threshold the coarsest
/// level stays selected. `levels` must be non-empty and ascending.
pub fn select_level(levels: &[LodLevel], distance: f32, multiplier: f32) -> usize {
    let first_beyond = levels
        .iter()
        .position(|level| level.threshold * multiplier > distance);
    match first_beyond {
        Some(0) => 0,
        Some(index) => index - 1,
        None => levels.len().saturating_sub(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(thresholds: &[f32]) -> Vec<LodLevel> {
        thresholds
            .iter()
            .enumerate()
            .map(|(index, threshold)| LodLevel::new(*threshold, RepresentationId(index as u64)))
            .collect()
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 6.0, 3.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(Vec3::ZERO.distance(Vec3::ZERO), 0.0);
    }

    #[test]
    fn select_level_covers_half_open_ranges() {
        let levels = levels(&[0.0, 500.0, 2000.0]);

        assert_eq!(select_level(&levels, 100.0, 1.0), 0);
        assert_eq!(select_level(&levels, 499.9, 1.0), 0);
        assert_eq!(select_level(&levels, 500.0, 1.0), 1);
        assert_eq!(select_level(&levels, 600.0, 1.0), 1);
        assert_eq!(select_level(&levels, 2500.0, 1.0), 2);
    }

    #[test]
    fn select_level_defaults_to_finest_when_first_threshold_not_reached() {
        let levels = levels(&[100.0, 500.0]);
        assert_eq!(select_level(&levels, 10.0, 1.0), 0);
    }

    #[test]
    fn larger_multiplier_keeps_detail_further_out() {
        let levels = levels(&[0.0, 500.0, 2000.0]);

        assert_eq!(select_level(&levels, 600.0, 2.0), 0);
        assert_eq!(select_level(&levels, 600.0, 0.7), 1);
        assert_eq!(select_level(&levels, 1500.0, 0.7), 2);
    }

    #[test]
    fn validation_rejects_empty_level_list() {
        assert_eq!(
            validate_levels(ObjectId(3), &[]),
            Err(LodError::NoLevels {
                object: ObjectId(3)
            })
        );
    }

    #[test]
    fn validation_rejects_bad_thresholds() {
        let negative = levels(&[0.0, -1.0]);
        let not_finite = levels(&[0.0, f32::NAN]);
        let descending = levels(&[0.0, 800.0, 400.0]);

        assert!(matches!(
            validate_levels(ObjectId(1), &negative),
            Err(LodError::InvalidThreshold { index: 1, .. })
        ));
        assert!(matches!(
            validate_levels(ObjectId(1), &not_finite),
            Err(LodError::InvalidThreshold { index: 1, .. })
        ));
        assert!(matches!(
            validate_levels(ObjectId(1), &descending),
            Err(LodError::NotAscending { index: 2, .. })
        ));
        assert!(validate_levels(ObjectId(1), &levels(&[0.0, 0.0, 10.0])).is_ok());
    }
}
