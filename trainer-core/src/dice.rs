//! Dice rolling for attacks.
//!
//! Supports the notation used on attack cards: `XdY` terms and flat
//! modifiers joined by `+`/`-` (e.g. `2d6+3`, `1d8+1d4-1`). To-hit rolls are
//! a d20 plus the attack's bonus, optionally with advantage.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest die accepted in notation.
pub const MAX_SIDES: u32 = 100;

/// Largest number of dice in a single term.
pub const MAX_COUNT: u32 = 100;

/// Error type for dice parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: d{0}")]
    InvalidDieSize(u32),
    #[error("Too many dice in one term: {0}")]
    TooManyDice(u32),
    #[error("No dice specified")]
    NoDice,
}

/// Advantage state for d20 rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Advantage {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

/// One `XdY` term, possibly negated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceTerm {
    pub count: u32,
    pub sides: u32,
    pub negative: bool,
}

/// A parsed dice expression (e.g. `2d6+3`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceExpression {
    pub terms: Vec<DiceTerm>,
    pub modifier: i32,
    pub original: String,
}

impl DiceExpression {
    /// Parse dice notation. Whitespace is ignored and `D` is accepted for `d`.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let normalized: String = notation
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        if normalized.is_empty() {
            return Err(DiceError::NoDice);
        }

        let mut terms = Vec::new();
        let mut modifier: i32 = 0;
        let mut negative = false;
        let mut current = String::new();

        for ch in normalized.chars() {
            if ch == '+' || ch == '-' {
                if !current.is_empty() {
                    Self::parse_term(&current, negative, &mut terms, &mut modifier)?;
                    current.clear();
                } else if !terms.is_empty() || modifier != 0 {
                    // Two signs in a row, e.g. "1d6+-2".
                    return Err(DiceError::InvalidNotation(normalized));
                }
                negative = ch == '-';
            } else {
                current.push(ch);
            }
        }

        if current.is_empty() {
            return Err(DiceError::InvalidNotation(normalized));
        }
        Self::parse_term(&current, negative, &mut terms, &mut modifier)?;

        if terms.is_empty() {
            return Err(DiceError::NoDice);
        }

        Ok(DiceExpression {
            terms,
            modifier,
            original: normalized,
        })
    }

    fn parse_term(
        s: &str,
        negative: bool,
        terms: &mut Vec<DiceTerm>,
        modifier: &mut i32,
    ) -> Result<(), DiceError> {
        let invalid = || DiceError::InvalidNotation(s.to_string());

        let Some((count_str, sides_str)) = s.split_once('d') else {
            let value: i32 = s.parse().map_err(|_| invalid())?;
            *modifier = if negative {
                modifier.saturating_sub(value)
            } else {
                modifier.saturating_add(value)
            };
            return Ok(());
        };

        let count: u32 = if count_str.is_empty() {
            1
        } else {
            count_str.parse().map_err(|_| invalid())?
        };
        let sides: u32 = sides_str.parse().map_err(|_| invalid())?;

        if !(2..=MAX_SIDES).contains(&sides) {
            return Err(DiceError::InvalidDieSize(sides));
        }
        if count == 0 {
            return Err(invalid());
        }
        if count > MAX_COUNT {
            return Err(DiceError::TooManyDice(count));
        }

        terms.push(DiceTerm {
            count,
            sides,
            negative,
        });
        Ok(())
    }

    /// Roll the expression.
    pub fn roll(&self) -> RollResult {
        self.roll_with_rng(&mut rand::thread_rng())
    }

    /// Roll with a specific RNG (useful for testing).
    pub fn roll_with_rng<R: Rng>(&self, rng: &mut R) -> RollResult {
        let rolls: Vec<Vec<u32>> = self
            .terms
            .iter()
            .map(|term| {
                (0..term.count)
                    .map(|_| rng.gen_range(1..=term.sides))
                    .collect()
            })
            .collect();

        let dice_total: i32 = self
            .terms
            .iter()
            .zip(&rolls)
            .map(|(term, rolled)| {
                let sum: i32 = rolled.iter().map(|r| *r as i32).sum();
                if term.negative {
                    -sum
                } else {
                    sum
                }
            })
            .sum();

        RollResult {
            expression: self.original.clone(),
            rolls,
            modifier: self.modifier,
            total: dice_total + self.modifier,
            natural: None,
        }
    }

    /// Lowest and highest possible totals.
    pub fn bounds(&self) -> (i32, i32) {
        self.terms
            .iter()
            .fold((self.modifier, self.modifier), |(lo, hi), term| {
                let min = term.count as i32;
                let max = (term.count * term.sides) as i32;
                if term.negative {
                    (lo - max, hi - min)
                } else {
                    (lo + min, hi + max)
                }
            })
    }
}

impl FromStr for DiceExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceExpression::parse(s)
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// Result of rolling an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    pub expression: String,
    /// Individual dice, grouped per term.
    pub rolls: Vec<Vec<u32>>,
    pub modifier: i32,
    pub total: i32,
    /// The kept d20 face for to-hit rolls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural: Option<u32>,
}

impl RollResult {
    pub fn is_critical(&self) -> bool {
        self.natural == Some(20)
    }

    pub fn is_fumble(&self) -> bool {
        self.natural == Some(1)
    }

    /// Format the individual dice for display, e.g. `[3, 5] + 2`.
    pub fn dice_display(&self) -> String {
        let dice = self
            .rolls
            .iter()
            .map(|group| {
                let faces: Vec<String> = group.iter().map(|r| r.to_string()).collect();
                format!("[{}]", faces.join(", "))
            })
            .collect::<Vec<_>>()
            .join(" + ");

        match self.modifier {
            0 => dice,
            m if m > 0 => format!("{dice} + {m}"),
            m => format!("{dice} - {}", m.abs()),
        }
    }
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.dice_display(), self.total)
    }
}

/// Convenience function to roll dice from a notation string.
pub fn roll(notation: &str) -> Result<RollResult, DiceError> {
    Ok(DiceExpression::parse(notation)?.roll())
}

/// Roll a d20 plus `bonus`, keeping the better or worse of two under (dis)advantage.
pub fn roll_to_hit<R: Rng>(bonus: i32, advantage: Advantage, rng: &mut R) -> RollResult {
    let first = rng.gen_range(1..=20u32);
    let (rolls, kept) = match advantage {
        Advantage::Normal => (vec![first], first),
        Advantage::Advantage => {
            let second = rng.gen_range(1..=20u32);
            (vec![first, second], first.max(second))
        }
        Advantage::Disadvantage => {
            let second = rng.gen_range(1..=20u32);
            (vec![first, second], first.min(second))
        }
    };

    let expression = match bonus {
        0 => "1d20".to_string(),
        b if b > 0 => format!("1d20+{b}"),
        b => format!("1d20-{}", b.abs()),
    };

    RollResult {
        expression,
        rolls: vec![rolls],
        modifier: bonus,
        total: kept as i32 + bonus,
        natural: Some(kept),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_simple() {
        let expr = DiceExpression::parse("1d20").unwrap();
        assert_eq!(expr.terms.len(), 1);
        assert_eq!(expr.terms[0].count, 1);
        assert_eq!(expr.terms[0].sides, 20);
        assert_eq!(expr.modifier, 0);
    }

    #[test]
    fn test_parse_with_modifier() {
        assert_eq!(DiceExpression::parse("2d6+3").unwrap().modifier, 3);
        assert_eq!(DiceExpression::parse("2d6 - 2").unwrap().modifier, -2);
        assert_eq!(DiceExpression::parse("D8").unwrap().terms[0].sides, 8);
    }

    #[test]
    fn test_parse_multiple_terms() {
        let expr = DiceExpression::parse("1d8+1d4-1").unwrap();
        assert_eq!(expr.terms.len(), 2);
        assert_eq!(expr.modifier, -1);
        assert_eq!(expr.bounds(), (1, 11));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(DiceExpression::parse(""), Err(DiceError::NoDice));
        assert_eq!(DiceExpression::parse("5"), Err(DiceError::NoDice));
        assert_eq!(DiceExpression::parse("1d1"), Err(DiceError::InvalidDieSize(1)));
        assert_eq!(DiceExpression::parse("500d6"), Err(DiceError::TooManyDice(500)));
        assert!(matches!(
            DiceExpression::parse("2d6+"),
            Err(DiceError::InvalidNotation(_))
        ));
        assert!(matches!(
            DiceExpression::parse("fireball"),
            Err(DiceError::InvalidNotation(_))
        ));
    }

    #[test]
    fn test_roll_stays_in_bounds() {
        let expr = DiceExpression::parse("2d6+3").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let result = expr.roll_with_rng(&mut rng);
            assert!((5..=15).contains(&result.total));
            assert_eq!(result.rolls[0].len(), 2);
        }
    }

    #[test]
    fn test_to_hit_advantage_keeps_higher() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let result = roll_to_hit(4, Advantage::Advantage, &mut rng);
            let faces = &result.rolls[0];
            assert_eq!(faces.len(), 2);
            let kept = *faces.iter().max().unwrap();
            assert_eq!(result.natural, Some(kept));
            assert_eq!(result.total, kept as i32 + 4);
        }
    }

    #[test]
    fn test_to_hit_disadvantage_keeps_lower() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let result = roll_to_hit(-1, Advantage::Disadvantage, &mut rng);
            let kept = *result.rolls[0].iter().min().unwrap();
            assert_eq!(result.total, kept as i32 - 1);
            assert_eq!(result.expression, "1d20-1");
        }
    }

    #[test]
    fn test_dice_display() {
        let result = RollResult {
            expression: "2d6-1".to_string(),
            rolls: vec![vec![3, 5]],
            modifier: -1,
            total: 7,
            natural: None,
        };
        assert_eq!(result.to_string(), "[3, 5] - 1 = 7");
    }
}
