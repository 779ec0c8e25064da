/// A straight-alpha 8-bit ARGB color, the unit of paint for strokes, fills and backgrounds.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ArgbColor {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}
impl ArgbColor {
    pub const TRANSPARENT: Self = Self::new(0x00, 0x00, 0x00, 0x00);
    pub const BLACK: Self = Self::new(0xFF, 0x00, 0x00, 0x00);
    pub const WHITE: Self = Self::new(0xFF, 0xFF, 0xFF, 0xFF);
    #[must_use]
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }
    /// Unpack from `0xAARRGGBB`.
    #[must_use]
    pub const fn from_u32(packed: u32) -> Self {
        let [a, r, g, b] = packed.to_be_bytes();
        Self { a, r, g, b }
    }
    #[must_use]
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes([self.a, self.r, self.g, self.b])
    }
    #[must_use]
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}
impl Default for ArgbColor {
    fn default() -> Self {
        Self::BLACK
    }
}
impl std::fmt::Display for ArgbColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:08X}", self.to_u32())
    }
}
