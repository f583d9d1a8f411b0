// rng.rs - Seedable xorshift32
//
// Every builder and the animator draw from an explicit Rng so scenes can be
// reproduced in tests and in the poster tool. The page seeds from entropy.

pub struct Rng {
    state: u32,
}

impl Rng {
    /// Seed 0 would lock xorshift at zero forever, so it is remapped.
    pub fn new(seed: u32) -> Self {
        Self { state: if seed == 0 { 0xDEADBEEF } else { seed } }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_entropy() -> Self {
        Self::new((js_sys::Math::random() * u32::MAX as f64) as u32)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_entropy() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
            .unwrap_or(0x12345678);
        Self::new(nanos)
    }

    /// Uniform in [0, 1)
    #[inline(always)]
    pub fn next_f32(&mut self) -> f32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        (self.state >> 8) as f32 * (1.0 / 16777216.0)
    }

    #[inline]
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// -1.0 or 1.0 with equal odds
    #[inline]
    pub fn sign(&mut self) -> f32 {
        if self.chance(0.5) { -1.0 } else { 1.0 }
    }

    /// `items` must be non-empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let i = ((self.next_f32() * items.len() as f32) as usize).min(items.len() - 1);
        &items[i]
    }
}
