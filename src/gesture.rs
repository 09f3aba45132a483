//! Swipe and scroll gesture interpretation.

/// Minimum drag distance before a gesture counts as a page turn.
pub const DEFAULT_SWIPE_THRESHOLD: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeCommand {
    Forward,
    Backward,
}

/// Map a raw gesture delta to at most one navigation step. Movement at or
/// below the threshold is treated as noise; past it, the gesture is exactly
/// one step regardless of how far it overshoots.
pub fn interpret(delta: f32, threshold: f32) -> Option<SwipeCommand> {
    if delta > threshold {
        Some(SwipeCommand::Forward)
    } else if delta < -threshold {
        Some(SwipeCommand::Backward)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_movement_is_ignored() {
        assert_eq!(interpret(30.0, 50.0), None);
        assert_eq!(interpret(-30.0, 50.0), None);
        assert_eq!(interpret(0.0, 50.0), None);
    }

    #[test]
    fn movement_exactly_at_the_threshold_is_ignored() {
        assert_eq!(interpret(50.0, 50.0), None);
        assert_eq!(interpret(-50.0, 50.0), None);
    }

    #[test]
    fn movement_past_the_threshold_is_one_step() {
        assert_eq!(interpret(50.1, 50.0), Some(SwipeCommand::Forward));
        assert_eq!(interpret(120.0, 50.0), Some(SwipeCommand::Forward));
        assert_eq!(interpret(-120.0, 50.0), Some(SwipeCommand::Backward));
    }

    #[test]
    fn overshoot_never_yields_more_than_one_command() {
        assert_eq!(interpret(5000.0, 50.0), Some(SwipeCommand::Forward));
        assert_eq!(interpret(-5000.0, 50.0), Some(SwipeCommand::Backward));
    }
}
