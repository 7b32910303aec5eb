use crate::NodeId;

/// Errors from scene construction and scene graph edits.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("invalid parameter {what}: {value}")]
    InvalidParameter { what: &'static str, value: f32 },
    #[error("missing child: {0}")]
    MissingChild(&'static str),
    #[error("node {0} not found")]
    UnknownNode(NodeId),
    #[error("node {0} is already attached to a parent")]
    AlreadyAttached(NodeId),
    #[error("attaching {child} under {parent} would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },
    #[error("shape handle {0} not found")]
    UnknownShape(u64),
    #[error("paint handle {0} not found")]
    UnknownPaint(u64),
    #[error("invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),
}

impl SceneError {
    /// Check that `value` is finite and strictly positive.
    pub fn ensure_positive(what: &'static str, value: f32) -> Result<f32, SceneError> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(SceneError::InvalidParameter { what, value })
        }
    }

    /// Check that `value` is finite.
    pub fn ensure_finite(what: &'static str, value: f32) -> Result<f32, SceneError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(SceneError::InvalidParameter { what, value })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_check() {
        assert_eq!(SceneError::ensure_positive("scale", 1.5), Ok(1.5));
        assert!(SceneError::ensure_positive("scale", 0.0).is_err());
        assert!(SceneError::ensure_positive("scale", -1.0).is_err());
        assert!(SceneError::ensure_positive("scale", f32::NAN).is_err());
        assert!(SceneError::ensure_positive("scale", f32::INFINITY).is_err());
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = SceneError::ensure_positive("radius", -0.5).unwrap_err();
        assert_eq!(err.to_string(), "invalid parameter radius: -0.5");
        assert_eq!(
            SceneError::MissingChild("pulley").to_string(),
            "missing child: pulley"
        );
    }
}
