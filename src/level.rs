/// What a level asks of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub level: u32,
    pub monsters: u32,
    pub rams: u32,
    pub coins: u32,
}

impl Level {
    /// Level `n` has `n` monsters, `n + 1` rams and `10 * n` coins.
    pub fn numbered(n: u32) -> Self {
        Self {
            level: n,
            monsters: n,
            rams: n + 1,
            coins: n * 10,
        }
    }
}

/// The fixed, non-empty list of levels of one game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Levels {
    levels: Vec<Level>,
}

impl Levels {
    /// Builds levels `1..=amount`; an amount of zero still yields one level.
    pub fn new(amount: u32) -> Self {
        let amount = amount.max(1);
        Self {
            levels: (1..=amount).map(Level::numbered).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn last(&self) -> Level {
        self.levels[self.levels.len() - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Level> {
        self.levels.iter()
    }

    /// Hands the levels to a forward-only cursor.
    pub fn cursor(self) -> LevelCursor {
        LevelCursor {
            levels: self.levels,
            idx: 0,
        }
    }
}

impl<'a> IntoIterator for &'a Levels {
    type Item = &'a Level;
    type IntoIter = std::slice::Iter<'a, Level>;

    fn into_iter(self) -> Self::IntoIter {
        self.levels.iter()
    }
}

/// Points at the current level; it only ever moves forward.
#[derive(Debug, Clone)]
pub struct LevelCursor {
    levels: Vec<Level>,
    idx: usize,
}

impl LevelCursor {
    pub fn current(&self) -> Level {
        self.levels[self.idx]
    }

    pub fn total(&self) -> usize {
        self.levels.len()
    }

    pub fn is_last(&self) -> bool {
        self.idx + 1 == self.levels.len()
    }

    /// Moves to the next level, `None` once the last one is current.
    pub fn advance(&mut self) -> Option<Level> {
        if self.is_last() {
            return None;
        }
        self.idx += 1;
        Some(self.current())
    }
}
