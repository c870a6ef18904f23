/// The value carried by an edge. Widths go up to 64 bits.
pub type Value = u64;

/// Largest supported width.
pub const MAX_BITS: u8 = 64;

/// Returns the mask with the low `bits` bits set.
///
/// # Example
///
/// ```
/// # use logicgraph::bits::width_mask;
/// assert_eq!(width_mask(4), 0b1111);
/// assert_eq!(width_mask(64), u64::MAX);
/// ```
#[inline(always)]
pub fn width_mask(bits: u8) -> Value {
    if bits >= MAX_BITS {
        Value::MAX
    } else {
        (1 << bits) - 1
    }
}

/// Returns `value` truncated to `bits` bits, `value & ((1 << bits) - 1)`.
///
/// # Example
///
/// ```
/// # use logicgraph::bits::mask;
/// assert_eq!(mask(0b1_0110, 4), 0b0110);
/// assert_eq!(mask(u64::MAX, 1), 1);
/// ```
#[inline(always)]
pub fn mask(value: Value, bits: u8) -> Value {
    value & width_mask(bits)
}

/// Returns the most significant bit of a `bits` wide value.
#[inline(always)]
pub fn sign_bit(value: Value, bits: u8) -> bool {
    bits > 0 && (value >> (bits.min(MAX_BITS) - 1)) & 1 == 1
}

/// Returns the number of bits needed to number `n` items, never less than 1.
///
/// # Example
///
/// ```
/// # use logicgraph::bits::index_bits;
/// assert_eq!(index_bits(1), 1);
/// assert_eq!(index_bits(2), 1);
/// assert_eq!(index_bits(4), 2);
/// assert_eq!(index_bits(5), 3);
/// ```
pub fn index_bits(n: usize) -> u8 {
    let mut bits = 1;
    while bits < usize::BITS as u8 && (1usize << bits) < n {
        bits += 1;
    }
    bits
}

/// An inclusive `(low, high)` bit range used by splitters and mergers.
///
/// Ranges given high-to-low are normalized, `(7, 4)` is the same range as `(4, 7)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitRange {
    low: u8,
    high: u8,
}

impl BitRange {
    pub fn new(a: u8, b: u8) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// Range covering the single bit `bit`.
    pub fn bit(bit: u8) -> Self {
        Self::new(bit, bit)
    }

    pub fn low(&self) -> u8 {
        self.low
    }

    pub fn high(&self) -> u8 {
        self.high
    }

    pub fn width(&self) -> u8 {
        (self.high - self.low).saturating_add(1)
    }

    /// Returns the part of this range that fits in a `bits` wide value.
    pub fn clamp(self, bits: u8) -> Self {
        let top = bits.max(1) - 1;
        Self::new(self.low.min(top), self.high.min(top))
    }

    /// Extracts the bits of this range from `value`, shifted down to bit 0.
    pub fn extract(&self, value: Value) -> Value {
        if self.low >= MAX_BITS {
            return 0;
        }
        mask(value >> self.low, self.width())
    }

    /// Places the low bits of `chunk` at this range's position.
    pub fn place(&self, chunk: Value) -> Value {
        if self.low >= MAX_BITS {
            return 0;
        }
        mask(chunk, self.width()) << self.low
    }
}

impl From<(u8, u8)> for BitRange {
    fn from((a, b): (u8, u8)) -> Self {
        Self::new(a, b)
    }
}

/// Returns one single-bit range per bit of a `bits` wide value, lowest first.
pub fn bit_ranges(bits: u8) -> Vec<BitRange> {
    (0..bits).map(BitRange::bit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        for bits in 1..=MAX_BITS {
            let masked = mask(Value::MAX, bits);
            assert_eq!(masked.count_ones(), bits as u32);
        }
        assert_eq!(mask(0x1ff, 8), 0xff);
    }

    #[test]
    fn test_sign_bit() {
        assert!(sign_bit(0b1000, 4));
        assert!(!sign_bit(0b0111, 4));
        assert!(sign_bit(u64::MAX, 64));
    }

    #[test]
    fn test_range_normalization() {
        let forward = BitRange::new(4, 7);
        let backward: BitRange = (7u8, 4u8).into();
        assert_eq!(forward, backward);
        assert_eq!(forward.width(), 4);
        assert_eq!(forward.extract(0b1011_0110), 0b1011);
        assert_eq!(forward.place(0b1011), 0b1011_0000);
        assert_eq!(forward.place(0xff), 0b1111_0000);
    }

    #[test]
    fn test_wide_ranges() {
        let range = BitRange::new(0, 255);
        assert_eq!(range.width(), 255);
        assert_eq!(range.extract(Value::MAX), Value::MAX);

        let clamped = range.clamp(8);
        assert_eq!(clamped, BitRange::new(0, 7));
        assert_eq!(clamped.width(), 8);
        assert_eq!(BitRange::new(10, 12).clamp(8), BitRange::bit(7));
    }

    #[test]
    fn test_bit_ranges() {
        let ranges = bit_ranges(3);
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[2], BitRange::bit(2));
        assert_eq!(ranges[2].extract(0b100), 1);
    }
}
