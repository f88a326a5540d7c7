/// Rotates agents around the table so that every agent takes the opening
/// seat in turn across a run.
pub struct SeatRotation {
    agents: usize,
}

impl SeatRotation {
    pub fn new(agents: usize) -> Self {
        Self { agents }
    }

    /// Agent index for each seat in the given match.
    pub fn for_match(&self, match_index: usize) -> Vec<usize> {
        if self.agents == 0 {
            return Vec::new();
        }
        (0..self.agents)
            .map(|seat| (seat + match_index) % self.agents)
            .collect()
    }
}
