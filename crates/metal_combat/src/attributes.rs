//! Base character attributes

use serde::{Deserialize, Serialize};

/// Starting value for every attribute
pub const BASE_ATTRIBUTE: u32 = 10;

/// Attribute selector used for point allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Strength,
    Dexterity,
    Intelligence,
}

impl Attribute {
    /// All attributes
    pub const ALL: [Attribute; 3] = [Self::Strength, Self::Dexterity, Self::Intelligence];
}

/// Strength, dexterity and intelligence before equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterAttributes {
    pub strength: u32,
    pub dexterity: u32,
    pub intelligence: u32,
}

impl Default for CharacterAttributes {
    fn default() -> Self {
        Self {
            strength: BASE_ATTRIBUTE,
            dexterity: BASE_ATTRIBUTE,
            intelligence: BASE_ATTRIBUTE,
        }
    }
}

impl CharacterAttributes {
    /// Create attributes
    pub fn new(strength: u32, dexterity: u32, intelligence: u32) -> Self {
        Self {
            strength,
            dexterity,
            intelligence,
        }
    }

    /// Read one attribute
    pub fn get(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Intelligence => self.intelligence,
        }
    }

    /// Raise one attribute
    pub fn increase(&mut self, attribute: Attribute, amount: u32) {
        let value = match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Dexterity => &mut self.dexterity,
            Attribute::Intelligence => &mut self.intelligence,
        };
        *value = value.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let attrs = CharacterAttributes::default();
        for attribute in Attribute::ALL {
            assert_eq!(attrs.get(attribute), 10);
        }
    }

    #[test]
    fn test_increase() {
        let mut attrs = CharacterAttributes::default();
        attrs.increase(Attribute::Dexterity, 3);
        assert_eq!(attrs.dexterity, 13);
        assert_eq!(attrs.strength, 10);
    }
}
