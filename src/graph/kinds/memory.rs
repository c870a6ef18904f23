use super::*;
use crate::bits::mask;
use std::collections::BTreeMap;

/// Tracks the last clock level a sequential node saw so it acts once per rising edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct EdgeDetector {
    high: bool,
}

impl EdgeDetector {
    /// Records `level` and returns true on a 0 to 1 transition.
    fn rising(&mut self, level: Value) -> bool {
        let high = level & 1 == 1;
        let rising = high && !self.high;
        self.high = high;
        rising
    }
}

/// Latches `D` into `Q` on a rising `CLK` while `en` is set. `Q` is written on every evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    bits: u8,
    q: Value,
    clock: EdgeDetector,
}

impl Register {
    pub fn new(bits: u8) -> Self {
        Self {
            bits,
            q: 0,
            clock: Default::default(),
        }
    }

    pub fn q(&self) -> Value {
        self.q
    }
}

impl Behavior for Register {
    fn bits(&self) -> u8 {
        self.bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .input("D", self.bits)
            .input("CLK", 1)
            .input("en", 1)
            .output("Q", self.bits)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let d = ctx.read("D")?;
        let clk = ctx.read("CLK")?;
        let en = ctx.read("en")?;
        if self.clock.rising(clk) && en & 1 == 1 {
            self.q = d;
        }
        ctx.write("Q", self.q);
        Ok(())
    }

    fn value(&self) -> Option<Value> {
        Some(self.q)
    }
}

/// Cell storage for an `address_bits` wide address space.
///
/// Cells are stored sparsely, every cell that was never written reads as 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryCells {
    address_bits: u8,
    data_bits: u8,
    cells: BTreeMap<usize, Value>,
}

impl MemoryCells {
    /// Returns cells holding `contents` in address order, truncated to the address space and masked to
    /// `data_bits`.
    pub fn new(address_bits: u8, data_bits: u8, contents: &[Value]) -> Self {
        let size = Self::size_of(address_bits);
        let cells = contents
            .iter()
            .take(size)
            .map(|value| mask(*value, data_bits))
            .enumerate()
            .filter(|(_, value)| *value != 0)
            .collect();
        Self {
            address_bits,
            data_bits,
            cells,
        }
    }

    fn size_of(address_bits: u8) -> usize {
        if address_bits as u32 >= usize::BITS {
            usize::MAX
        } else {
            1 << address_bits
        }
    }

    /// Number of addressable cells.
    pub fn size(&self) -> usize {
        Self::size_of(self.address_bits)
    }

    fn slot(&self, address: Value) -> usize {
        (address as usize) % self.size()
    }

    /// Reads the cell at `address`, wrapping out of range addresses.
    pub fn read(&self, address: Value) -> Value {
        self.cells.get(&self.slot(address)).copied().unwrap_or(0)
    }

    pub fn write(&mut self, address: Value, value: Value) {
        let slot = self.slot(address);
        self.cells.insert(slot, mask(value, self.data_bits));
    }

    /// Contents in address order, zero padded to `len` cells.
    pub fn dump(&self, len: usize) -> Vec<Value> {
        (0..len.min(self.size())).map(|i| self.read(i as Value)).collect()
    }
}

/// Read/write memory. Stores `Din` at `A` on a rising `CLK` while `st` is set, drives `D` with the
/// cell at `A` while `ld` is set and 0 otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ram {
    cells: MemoryCells,
    clock: EdgeDetector,
}

impl Ram {
    pub fn new(address_bits: u8, data_bits: u8) -> Self {
        Self::with_contents(address_bits, data_bits, &[])
    }

    pub fn with_contents(address_bits: u8, data_bits: u8, contents: &[Value]) -> Self {
        Self {
            cells: MemoryCells::new(address_bits, data_bits, contents),
            clock: Default::default(),
        }
    }

    pub fn cells(&self) -> &MemoryCells {
        &self.cells
    }
}

impl Behavior for Ram {
    fn bits(&self) -> u8 {
        self.cells.data_bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .input("A", self.cells.address_bits)
            .input("Din", self.cells.data_bits)
            .input("st", 1)
            .input("ld", 1)
            .input("CLK", 1)
            .output("D", self.cells.data_bits)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let address = ctx.read("A")?;
        let din = ctx.read("Din")?;
        let st = ctx.read("st")?;
        let ld = ctx.read("ld")?;
        let clk = ctx.read("CLK")?;
        if self.clock.rising(clk) && st & 1 == 1 {
            self.cells.write(address, din);
        }
        let out = if ld & 1 == 1 {
            self.cells.read(address)
        } else {
            0
        };
        ctx.write("D", out);
        Ok(())
    }
}

/// Read only memory. Drives `D` with the cell at `A` while `sel` is set, `sel` defaults to set when
/// unconnected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rom {
    cells: MemoryCells,
}

impl Rom {
    pub fn new(address_bits: u8, data_bits: u8, contents: &[Value]) -> Self {
        Self {
            cells: MemoryCells::new(address_bits, data_bits, contents),
        }
    }

    pub fn cells(&self) -> &MemoryCells {
        &self.cells
    }
}

impl Behavior for Rom {
    fn bits(&self) -> u8 {
        self.cells.data_bits
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .input("A", self.cells.address_bits)
            .input("sel", 1)
            .output("D", self.cells.data_bits)
    }

    fn propagate(&mut self, ctx: &mut Propagation<'_>) -> Result<(), PortFault> {
        let address = ctx.read("A")?;
        let sel = ctx.read_or("sel", 1)?;
        let out = if sel & 1 == 1 {
            self.cells.read(address)
        } else {
            0
        };
        ctx.write("D", out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_detector() {
        let mut clock = EdgeDetector::default();
        assert!(!clock.rising(0));
        assert!(clock.rising(1));
        assert!(!clock.rising(1));
        assert!(!clock.rising(0));
        assert!(clock.rising(1));
    }

    #[test]
    fn test_cells_padding_and_truncation() {
        let cells = MemoryCells::new(2, 4, &[1, 2, 0x13, 4, 5, 6]);
        assert_eq!(cells.size(), 4);
        // Truncated to 4 cells and masked to 4 bits.
        assert_eq!(cells.dump(8), vec![1, 2, 3, 4]);

        let cells = MemoryCells::new(3, 8, &[9]);
        assert_eq!(cells.dump(8), vec![9, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_cells_wrap() {
        let mut cells = MemoryCells::new(2, 8, &[]);
        cells.write(6, 0xab);
        assert_eq!(cells.read(2), 0xab);
        assert_eq!(cells.read(6), 0xab);
        assert_eq!(cells.read(3), 0);
    }

    #[test]
    fn test_large_address_space_is_sparse() {
        let mut cells = MemoryCells::new(32, 32, &[7]);
        assert_eq!(cells.read(0), 7);
        assert_eq!(cells.read(0xffff_0000), 0);
        cells.write(0xffff_0000, 3);
        assert_eq!(cells.read(0xffff_0000), 3);
    }
}
