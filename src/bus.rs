// Bus module - Interface for memory that can be installed into the VM address space
//
// The interpreter owns the address map. Anything that wants to appear in it
// (the screen's graph and buffer RAM, for instance) implements
// `MemoryMappedDevice` and is addressed relative to its own start.

/// Trait for memory-mapped components
///
/// Components implementing this trait can be installed at `start_address()`
/// and serve `len()` bytes from there on. Addresses passed to `read` and
/// `write` are offsets from the start of the device.
pub trait MemoryMappedDevice {
    /// Read a byte from the device
    ///
    /// Takes `&mut self` so devices may have side effects on read.
    ///
    /// # Arguments
    /// * `addr` - Offset into the device
    fn read(&mut self, addr: u16) -> u8;

    /// Write a byte to the device
    ///
    /// # Arguments
    /// * `addr` - Offset into the device
    /// * `data` - The byte value to write
    fn write(&mut self, addr: u16, data: u8);

    /// First VM address the device occupies
    fn start_address(&self) -> u16;

    /// Number of bytes the device occupies
    fn len(&self) -> usize;

    /// Whether the device occupies no addresses at all
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a VM address falls inside this device
    fn covers(&self, addr: u16) -> bool {
        let start = usize::from(self.start_address());
        let addr = usize::from(addr);
        addr >= start && addr < start + self.len()
    }
}
