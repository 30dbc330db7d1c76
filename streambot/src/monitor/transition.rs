//! Live/offline transition detection.

/// Change between the stored live flag and a fresh status read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Transition {
    WentLive,
    WentOffline,
    StillLive,
    StillOffline,
}

impl Transition {
    pub fn between(was_live: bool, is_live: bool) -> Self {
        match (was_live, is_live) {
            (false, true) => Self::WentLive,
            (true, false) => Self::WentOffline,
            (true, true) => Self::StillLive,
            (false, false) => Self::StillOffline,
        }
    }

    /// Whether the live flag flipped.
    pub fn is_change(self) -> bool {
        matches!(self, Self::WentLive | Self::WentOffline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_between() {
        assert_eq!(Transition::between(false, true), Transition::WentLive);
        assert_eq!(Transition::between(true, false), Transition::WentOffline);
        assert_eq!(Transition::between(true, true), Transition::StillLive);
        assert_eq!(Transition::between(false, false), Transition::StillOffline);
    }

    #[test]
    fn test_is_change() {
        assert!(Transition::WentLive.is_change());
        assert!(Transition::WentOffline.is_change());
        assert!(!Transition::StillLive.is_change());
        assert!(!Transition::StillOffline.is_change());
        assert_eq!(Transition::WentOffline.to_string(), "went_offline");
    }
}
