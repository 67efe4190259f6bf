use rand::Rng;

/// Convenience rolls used all over map generation.
pub trait RngExt {
    /// True with `percent` in a hundred odds. Values of 100 or more
    /// always succeed.
    fn percent_chance(&mut self, percent: u32) -> bool;

    fn one_chance_in(&mut self, n: usize) -> bool;
}

impl<T: Rng + ?Sized> RngExt for T {
    fn percent_chance(&mut self, percent: u32) -> bool {
        self.gen_range(0..100) < percent
    }

    fn one_chance_in(&mut self, n: usize) -> bool {
        if n == 0 {
            return false;
        }
        self.gen_range(0..n) == 0
    }
}
