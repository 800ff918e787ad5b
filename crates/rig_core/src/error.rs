//! Error taxonomy shared by all rig operations.

use std::fmt;

use thiserror::Error;

/// Failure of a pure geometric query.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    /// Head and tail coincide, so the bone has no usable axis.
    #[error("degenerate bone: head and tail are {length} units apart")]
    DegenerateBone { length: f32 },
}

/// The kind of host entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Armature,
    Mesh,
    Bone,
    VertexGroup,
    Collider,
    ColliderGroup,
    Spring,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Armature => "armature",
            EntityKind::Mesh => "mesh",
            EntityKind::Bone => "bone",
            EntityKind::VertexGroup => "vertex group",
            EntityKind::Collider => "collider",
            EntityKind::ColliderGroup => "collider group",
            EntityKind::Spring => "spring",
        };
        f.write_str(name)
    }
}

/// Errors raised while augmenting a rig.
///
/// Everything except [`RigError::Unexpected`] is recoverable: the affected
/// unit of work is skipped, a warning is recorded, and the batch continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RigError {
    #[error("{kind} '{name}' not found")]
    MissingEntity { kind: EntityKind, name: String },

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("spring '{spring}' has joints on both sides; skipping joint assignment")]
    AmbiguousClassification { spring: String },

    #[error("{0}")]
    Unexpected(String),
}

impl RigError {
    pub fn missing(kind: EntityKind, name: impl Into<String>) -> Self {
        RigError::MissingEntity {
            kind,
            name: name.into(),
        }
    }

    pub fn degenerate(what: impl fmt::Display) -> Self {
        RigError::DegenerateGeometry(what.to_string())
    }

    pub fn unexpected(what: impl fmt::Display) -> Self {
        RigError::Unexpected(what.to_string())
    }

    /// Whether the batch may continue after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, RigError::Unexpected(_))
    }
}

impl From<GeometryError> for RigError {
    fn from(err: GeometryError) -> Self {
        RigError::DegenerateGeometry(err.to_string())
    }
}

pub type RigResult<T> = Result<T, RigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entity_message_names_kind_and_name() {
        let err = RigError::missing(EntityKind::VertexGroup, "J_Bip_L_UpperLeg");
        assert_eq!(err.to_string(), "vertex group 'J_Bip_L_UpperLeg' not found");
        assert!(err.is_recoverable());
    }

    #[test]
    fn unexpected_is_not_recoverable() {
        assert!(!RigError::unexpected("boom").is_recoverable());
    }

    #[test]
    fn geometry_error_converts_to_degenerate() {
        let err: RigError = GeometryError::DegenerateBone { length: 0.0 }.into();
        assert!(matches!(err, RigError::DegenerateGeometry(_)));
    }
}
