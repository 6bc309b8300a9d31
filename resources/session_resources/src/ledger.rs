use {crate::Rejection, std::collections::BTreeSet};

/// Which puzzle pieces have been picked up this run. Entries only ever go
/// from missing to collected; [`PuzzleLedger::clear`] is the single way back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleLedger {
    total: u32,
    collected: BTreeSet<u32>,
}

impl PuzzleLedger {
    pub fn new(total: u32) -> Self {
        Self {
            total,
            collected: BTreeSet::new(),
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Marks `id` and returns the new collected count.
    pub fn collect(&mut self, id: u32) -> Result<u32, Rejection> {
        if id == 0 || id > self.total {
            return Err(Rejection::OutOfRange {
                id,
                total: self.total,
            });
        }
        if !self.collected.insert(id) {
            return Err(Rejection::AlreadyCollected(id));
        }
        Ok(self.collected_count())
    }

    pub fn is_collected(&self, id: u32) -> bool {
        self.collected.contains(&id)
    }

    pub fn collected_count(&self) -> u32 {
        self.collected.len() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.collected_count() >= self.total
    }

    /// `collected / total` in `[0, 1]`; zero for an empty ledger.
    pub fn progress_fraction(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.collected_count() as f32 / self.total as f32
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.collected.iter().copied()
    }

    pub fn clear(&mut self) {
        self.collected.clear();
    }
}
