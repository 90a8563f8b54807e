/// Small xorshift generator for scene placement.
///
/// Owned by whoever builds the scene; there is no global state. Quality only
/// needs to be good enough to scatter decoration and particles.
pub struct SceneRng {
    state: u32,
}

impl SceneRng {
    pub fn new(seed: u64) -> Self {
        let folded = (seed ^ (seed >> 32)) as u32;
        // xorshift has a fixed point at zero.
        let state = if folded == 0 { 0x9e37_79b9 } else { folded };
        Self { state }
    }

    /// Seed from the platform entropy source, falling back to a fixed seed.
    pub fn from_entropy() -> Self {
        let mut bytes = [0u8; 8];
        match getrandom::getrandom(&mut bytes) {
            Ok(()) => Self::new(u64::from_le_bytes(bytes)),
            Err(e) => {
                log::warn!("Entropy unavailable ({e}), using fixed scene seed");
                Self::new(12345)
            }
        }
    }

    fn next_u32(&mut self) -> u32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform in `[lo, hi)`.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    /// Uniform in `[-extent / 2, extent / 2)`.
    pub fn centered(&mut self, extent: f32) -> f32 {
        (self.next_f32() - 0.5) * extent
    }
}
