use rand::distributions::{Distribution, Uniform};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpace {
    pub size: usize,
}

impl ActionSpace {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        Uniform::from(0..self.size).sample(rng)
    }

    pub fn contains(&self, action: usize) -> bool {
        action < self.size
    }
}
