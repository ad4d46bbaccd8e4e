//! Progress milestones and their celebratory notes.
//!
//! Milestones are derived from capped progress percentages, never stored.
//! A single add can jump several thresholds; only the lowest crossed one
//! fires, so a burst of entries still celebrates milestones in order.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::settings::Language;

/// Progress thresholds that trigger a celebratory note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Milestone {
    #[serde(rename = "25")]
    Quarter,
    #[serde(rename = "50")]
    Half,
    #[serde(rename = "75")]
    ThreeQuarters,
    #[serde(rename = "100")]
    Full,
}

pub const MILESTONES: [Milestone; 4] = [
    Milestone::Quarter,
    Milestone::Half,
    Milestone::ThreeQuarters,
    Milestone::Full,
];

impl Milestone {
    pub fn percentage(&self) -> u32 {
        match self {
            Milestone::Quarter => 25,
            Milestone::Half => 50,
            Milestone::ThreeQuarters => 75,
            Milestone::Full => 100,
        }
    }
}

/// The lowest milestone with `old < m <= new`, if any.
pub fn check_milestone_crossed(old_pct: f64, new_pct: f64) -> Option<Milestone> {
    MILESTONES.into_iter().find(|m| {
        let threshold = m.percentage() as f64;
        old_pct < threshold && new_pct >= threshold
    })
}

/// The next milestone above the given progress, `None` at or past 100.
pub fn next_milestone(pct: f64) -> Option<Milestone> {
    MILESTONES
        .into_iter()
        .find(|m| pct < m.percentage() as f64)
}

/// Pick a random celebratory note for a crossed milestone.
pub fn milestone_message(
    milestone: Milestone,
    language: Language,
    rng: &mut impl Rng,
) -> &'static str {
    let pool: &[&'static str] = match (milestone, language) {
        (Milestone::Quarter, Language::En) => &[
            "Great start! 💧",
            "First quarter down! ✨",
            "Keep the glasses coming! 🌸",
            "Nice pace so far! 💙",
        ],
        (Milestone::Quarter, Language::Ru) => &[
            "Отличное начало! 💧",
            "Первая четверть позади! ✨",
            "Так держать! 🌸",
            "Хороший темп! 💙",
        ],
        (Milestone::Half, Language::En) => &[
            "Halfway there! ⭐",
            "50% and counting! ✨",
            "Solid progress! 💧",
            "Unstoppable! 🚀",
        ],
        (Milestone::Half, Language::Ru) => &[
            "Уже половина! ⭐",
            "50% и дальше! ✨",
            "Отличный прогресс! 💧",
            "Тебя не остановить! 🚀",
        ],
        (Milestone::ThreeQuarters, Language::En) => &[
            "Almost there! 💪",
            "75% done! ✨",
            "So close to the goal! 🎯",
            "Final stretch! 💙",
        ],
        (Milestone::ThreeQuarters, Language::Ru) => &[
            "Почти у цели! 💪",
            "75% позади! ✨",
            "Ещё чуть-чуть! 🎯",
            "Финишная прямая! 💙",
        ],
        (Milestone::Full, Language::En) => &[
            "Goal reached! 🎉",
            "100%! Well done! 🏆",
            "Daily goal complete! 💧✨",
            "Hydration champion! 👑",
        ],
        (Milestone::Full, Language::Ru) => &[
            "Цель достигнута! 🎉",
            "100%! Молодец! 🏆",
            "Дневная цель выполнена! 💧✨",
            "Чемпион гидратации! 👑",
        ],
    };
    pool.choose(rng).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn crossing_returns_lowest_milestone() {
        assert_eq!(check_milestone_crossed(10.0, 60.0), Some(Milestone::Quarter));
        assert_eq!(check_milestone_crossed(30.0, 60.0), Some(Milestone::Half));
        assert_eq!(check_milestone_crossed(80.0, 100.0), Some(Milestone::Full));
    }

    #[test]
    fn no_crossing_within_a_band() {
        assert_eq!(check_milestone_crossed(26.0, 49.0), None);
        assert_eq!(check_milestone_crossed(0.0, 24.9), None);
        assert_eq!(check_milestone_crossed(100.0, 100.0), None);
    }

    #[test]
    fn boundary_is_inclusive_on_the_new_side() {
        assert_eq!(check_milestone_crossed(24.9, 25.0), Some(Milestone::Quarter));
        assert_eq!(check_milestone_crossed(25.0, 25.0), None);
    }

    #[test]
    fn next_milestone_walks_the_ladder() {
        assert_eq!(next_milestone(0.0), Some(Milestone::Quarter));
        assert_eq!(next_milestone(25.0), Some(Milestone::Half));
        assert_eq!(next_milestone(74.9), Some(Milestone::ThreeQuarters));
        assert_eq!(next_milestone(75.0), Some(Milestone::Full));
        assert_eq!(next_milestone(100.0), None);
    }

    #[test]
    fn messages_exist_for_every_milestone_and_language() {
        let mut rng = Pcg64::seed_from_u64(7);
        for m in MILESTONES {
            for lang in [Language::En, Language::Ru] {
                assert!(!milestone_message(m, lang, &mut rng).is_empty());
            }
        }
    }

    #[test]
    fn seeded_pick_is_deterministic() {
        let a = milestone_message(Milestone::Half, Language::En, &mut Pcg64::seed_from_u64(42));
        let b = milestone_message(Milestone::Half, Language::En, &mut Pcg64::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
