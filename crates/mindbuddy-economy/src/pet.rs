//! The virtual pet

use serde::{Deserialize, Serialize};

/// Happiness is bounded to this cap; boosts beyond it are lost.
pub const HAPPINESS_CAP: u8 = 100;

/// Derived mood bands for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PetMood {
    Thriving,
    Happy,
    Content,
    NeedsCare,
}

/// The student's virtual pet: a name and a bounded happiness resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    name: String,
    happiness: u8,
}

impl Pet {
    /// Create a pet; the starting happiness is clamped to the cap.
    pub fn new(name: impl Into<String>, happiness: u8) -> Self {
        Self {
            name: name.into(),
            happiness: happiness.min(HAPPINESS_CAP),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn happiness(&self) -> u8 {
        self.happiness
    }

    /// Whether happiness sits at the cap (feeding is rejected)
    pub fn is_satisfied(&self) -> bool {
        self.happiness >= HAPPINESS_CAP
    }

    /// Increase happiness, clamped at the cap. Excess is lost, not
    /// carried over. Returns the new happiness.
    pub fn boost(&mut self, amount: u8) -> u8 {
        self.happiness = self.happiness.saturating_add(amount).min(HAPPINESS_CAP);
        self.happiness
    }

    /// Mood band derived from happiness
    pub fn mood(&self) -> PetMood {
        match self.happiness {
            80.. => PetMood::Thriving,
            60..=79 => PetMood::Happy,
            40..=59 => PetMood::Content,
            _ => PetMood::NeedsCare,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boost_clamps_to_cap() {
        let mut pet = Pet::new("Buddy", 95);
        assert_eq!(pet.boost(20), 100);
        assert_eq!(pet.happiness(), 100);
        assert!(pet.is_satisfied());
    }

    #[test]
    fn test_starting_happiness_clamped() {
        let pet = Pet::new("Buddy", 250);
        assert_eq!(pet.happiness(), 100);
    }

    #[test]
    fn test_mood_bands() {
        assert_eq!(Pet::new("Buddy", 80).mood(), PetMood::Thriving);
        assert_eq!(Pet::new("Buddy", 78).mood(), PetMood::Happy);
        assert_eq!(Pet::new("Buddy", 45).mood(), PetMood::Content);
        assert_eq!(Pet::new("Buddy", 39).mood(), PetMood::NeedsCare);
    }
}
