/*! Allocate identifiers for resources and clip paths.

Every gradient, shadow and clip path written to a page is referenced from other
elements by its `id`. The allocator belongs to one drawing session, so two
sessions never share state. By default identifiers are 128 bits of randomness
in hex; a seeded allocator produces the same sequence on every run, which makes
the output reproducible.
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The source of all identifiers of one session.
pub struct IdAllocator {
    rng: StdRng,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::random()
    }
}

impl IdAllocator {
    /// An allocator seeded from the operating system.
    pub fn random() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// An allocator that yields the same identifiers for the same seed.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Allocate a new identifier.
    pub fn alloc_id(&mut self) -> String {
        format!("{:032x}", self.rng.gen::<u128>())
    }
}
