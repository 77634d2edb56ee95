//! The partially revealed word shown to guessers.

use rand::Rng;
use rand::seq::IndexedRandom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    ch: char,
    revealed: bool,
}

/// One slot per character of the secret word.
///
/// Whitespace is never hidden, so multi-word answers show their gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hint {
    slots: Vec<Slot>,
}

impl Hint {
    /// All letters hidden.
    pub fn new(word: &str) -> Self {
        Self {
            slots: word
                .chars()
                .map(|ch| Slot {
                    ch,
                    revealed: ch.is_whitespace(),
                })
                .collect(),
        }
    }

    /// Reveals one hidden letter chosen uniformly at random.
    ///
    /// Returns the revealed position, or `None` if nothing was hidden.
    pub fn reveal_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        let hidden: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.revealed)
            .map(|(i, _)| i)
            .collect();
        let &index = hidden.choose(rng)?;
        self.slots[index].revealed = true;
        Some(index)
    }

    /// Letters revealed so far.
    pub fn revealed_letters(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.revealed && !slot.ch.is_whitespace())
            .count()
    }

    pub fn hidden_letters(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.revealed).count()
    }

    /// Number of slots, equal to the word's character count.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Wire form: `"t _ _ e"`.
    pub fn render(&self) -> String {
        self.slots
            .iter()
            .map(|slot| if slot.revealed { slot.ch } else { '_' })
            .map(String::from)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
