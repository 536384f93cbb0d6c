//! Turn phases.

use serde::{Deserialize, Serialize};

/// Phases of a turn, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Draw,
    Main1,
    Battle,
    Main2,
    End,
}

impl Phase {
    pub const ALL: [Phase; 5] = [Phase::Draw, Phase::Main1, Phase::Battle, Phase::Main2, Phase::End];

    /// Main phases allow summons and activations.
    #[must_use]
    pub const fn is_main(self) -> bool {
        matches!(self, Phase::Main1 | Phase::Main2)
    }

    /// The phase after this one, wrapping END back to DRAW.
    #[must_use]
    pub const fn next(self) -> Phase {
        match self {
            Phase::Draw => Phase::Main1,
            Phase::Main1 => Phase::Battle,
            Phase::Battle => Phase::Main2,
            Phase::Main2 => Phase::End,
            Phase::End => Phase::Draw,
        }
    }

    /// Advancing from here runs end-of-turn processing.
    #[must_use]
    pub const fn ends_turn(self) -> bool {
        matches!(self, Phase::Main2 | Phase::End)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Draw => "DRAW",
            Phase::Main1 => "MAIN1",
            Phase::Battle => "BATTLE",
            Phase::Main2 => "MAIN2",
            Phase::End => "END",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle() {
        let mut phase = Phase::Draw;
        for expected in Phase::ALL.iter().skip(1).chain(std::iter::once(&Phase::Draw)) {
            phase = phase.next();
            assert_eq!(phase, *expected);
        }
    }

    #[test]
    fn test_classification() {
        assert!(Phase::Main1.is_main());
        assert!(Phase::Main2.is_main());
        assert!(!Phase::Battle.is_main());
        assert!(Phase::Main2.ends_turn());
        assert!(Phase::End.ends_turn());
        assert!(!Phase::Battle.ends_turn());
        assert_eq!(Phase::Main1.to_string(), "MAIN1");
    }
}
