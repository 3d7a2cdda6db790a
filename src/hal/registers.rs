//! BCM2835 GPIO register block.
//!
//! Reference: BCM2835 ARM Peripherals, chapter 6.
//!
//! ```text
//! 0x00  GPFSEL0..5   function select, 10 pins per word, 3 bits per pin
//! 0x18  reserved
//! 0x1C  GPSET0..1    write 1 to drive a pin high
//! 0x24  reserved
//! 0x28  GPCLR0..1    write 1 to drive a pin low
//! ```
//!
//! Set and clear are write-only strobes: zero bits have no effect, so they
//! never need a read. Function select is shared by ten pins and must be
//! read-modify-written one 3-bit field at a time.

use core::cell::UnsafeCell;
use core::ptr::{self, NonNull};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use memmap2::{MmapMut, MmapOptions};

use crate::error::{LedError, Result};

/// Physical base address of the GPIO block (BCM2835, Pi 1 / Zero).
pub const GPIO_BASE: u64 = 0x2020_0000;

/// Pins per function-select register.
pub const PINS_PER_FSEL: u8 = 10;

/// Width of one function-select field.
pub const FSEL_BITS: u32 = 3;

const FSEL_MASK: u32 = 0b111;

/// Register layout, word for word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct GpioRegisterMap {
    pub fsel: [u32; 6],
    pub reserved1: u32,
    pub set: [u32; 2],
    pub reserved2: u32,
    pub clr: [u32; 2],
}

/// Bytes covered by [`GpioRegisterMap`].
pub const REGISTER_BLOCK_LEN: usize = core::mem::size_of::<GpioRegisterMap>();

/// Pin function (GPFSELn field value).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Function {
    Input = 0b000,
    Output = 0b001,
    Alt0 = 0b100,
    Alt1 = 0b101,
    Alt2 = 0b110,
    Alt3 = 0b111,
    Alt4 = 0b011,
    Alt5 = 0b010,
}

impl Function {
    /// Decode a 3-bit field value.
    pub fn from_bits(bits: u32) -> Self {
        match bits & FSEL_MASK {
            0b000 => Function::Input,
            0b001 => Function::Output,
            0b100 => Function::Alt0,
            0b101 => Function::Alt1,
            0b110 => Function::Alt2,
            0b111 => Function::Alt3,
            0b011 => Function::Alt4,
            _ => Function::Alt5,
        }
    }
}

/// Function-select register index and bit offset for a pin.
#[inline]
pub fn fsel_position(pin: u8) -> (usize, u32) {
    let index = (pin / PINS_PER_FSEL) as usize;
    let offset = (pin % PINS_PER_FSEL) as u32 * FSEL_BITS;
    (index, offset)
}

/// Set/clear register index and single-bit mask for a pin.
#[inline]
pub fn level_position(pin: u8) -> (usize, u32) {
    ((pin / 32) as usize, 1 << (pin % 32))
}

enum Backing {
    Mapped(MmapMut),
    Simulated(Box<UnsafeCell<GpioRegisterMap>>),
}

/// Owned view over the GPIO register block.
///
/// Either maps the physical block through a memory device or, for host
/// runs and tests, backs it with plain heap memory that behaves like a
/// register file (no strobe semantics, last write wins).
///
/// Every register access, including the read-modify-write of a function
/// select word, happens under one bank-wide lock, so two threads touching
/// neighbouring pins cannot lose each other's update.
///
/// The mapping is released when the bank is dropped. Every [`GpioPin`]
/// borrows the bank, so the pins (and the transmitter that drives one low
/// on drop) are always gone before the unmap.
///
/// [`GpioPin`]: crate::hal::gpio::GpioPin
pub struct RegisterBank {
    regs: NonNull<GpioRegisterMap>,
    backing: Backing,
    access: Mutex<()>,
}

// SAFETY: `regs` points into memory the bank owns, and every read or write
// through it is made while holding `access`, so no two accesses overlap.
unsafe impl Send for RegisterBank {}
unsafe impl Sync for RegisterBank {}

impl RegisterBank {
    /// Map the register block at physical address `base` through `path`
    /// (`/dev/mem` with [`GPIO_BASE`], or `/dev/gpiomem` with base 0).
    pub fn map(path: impl AsRef<Path>, base: u64) -> Result<Self> {
        let path = path.as_ref();
        let map_error = |source| LedError::Map {
            path: path.to_path_buf(),
            base,
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(map_error)?;

        // SAFETY: the range is device memory. This process maps it exactly
        // once and only touches it through volatile accesses.
        let mut mmap = unsafe {
            MmapOptions::new()
                .offset(base)
                .len(REGISTER_BLOCK_LEN)
                .map_mut(&file)
        }
        .map_err(map_error)?;

        let regs = NonNull::from(&mut mmap[..]).cast::<GpioRegisterMap>();
        Ok(Self {
            regs,
            backing: Backing::Mapped(mmap),
            access: Mutex::new(()),
        })
    }

    /// Heap-backed bank with every register zeroed.
    pub fn simulated() -> Self {
        Self::simulated_with(GpioRegisterMap::default())
    }

    /// Heap-backed bank starting from `initial`.
    pub fn simulated_with(initial: GpioRegisterMap) -> Self {
        let cell = Box::new(UnsafeCell::new(initial));
        // SAFETY: UnsafeCell::get on a live box is never null, and the box
        // is moved into the bank without reallocating.
        let regs = unsafe { NonNull::new_unchecked(cell.get()) };
        Self {
            regs,
            backing: Backing::Simulated(cell),
            access: Mutex::new(()),
        }
    }

    /// True when backed by real device memory.
    pub fn is_mapped(&self) -> bool {
        matches!(self.backing, Backing::Mapped(_))
    }

    // Registers are plain words; a panic while holding the lock cannot leave
    // them half written, so poisoning is ignored.
    fn lock(&self) -> Registers<'_> {
        Registers {
            regs: self.regs,
            _guard: self.access.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Select the function of `pin`, leaving the other nine fields of the
    /// register untouched.
    pub fn set_function(&self, pin: u8, function: Function) {
        let (index, offset) = fsel_position(pin);
        let mask = FSEL_MASK << offset;
        let field = ((function as u32) << offset) & mask;

        let regs = self.lock();
        let old = regs.read_fsel(index);
        regs.write_fsel(index, (old & !mask) | field);
    }

    /// Configure `pin` as an output.
    #[inline]
    pub fn configure_output(&self, pin: u8) {
        self.set_function(pin, Function::Output);
    }

    /// Current function of `pin`.
    pub fn function(&self, pin: u8) -> Function {
        let (index, offset) = fsel_position(pin);
        Function::from_bits(self.lock().read_fsel(index) >> offset)
    }

    /// Drive `pin` high.
    #[inline]
    pub fn set_high(&self, pin: u8) {
        let (index, mask) = level_position(pin);
        self.lock().write_set(index, mask);
    }

    /// Drive `pin` low.
    #[inline]
    pub fn set_low(&self, pin: u8) {
        let (index, mask) = level_position(pin);
        self.lock().write_clr(index, mask);
    }

    /// Copy of the whole block, for diffs.
    pub fn snapshot(&self) -> GpioRegisterMap {
        let regs = self.lock();
        // SAFETY: regs points at a live, aligned GpioRegisterMap and the
        // access lock is held.
        unsafe { ptr::read_volatile(regs.regs.as_ptr()) }
    }
}

/// Raw register access, only reachable with the bank's access lock held.
struct Registers<'a> {
    regs: NonNull<GpioRegisterMap>,
    _guard: MutexGuard<'a, ()>,
}

impl Registers<'_> {
    #[inline]
    fn read_fsel(&self, index: usize) -> u32 {
        // SAFETY: aligned pointer into the owned block; index is bounds checked.
        unsafe { ptr::read_volatile(ptr::addr_of!((*self.regs.as_ptr()).fsel[index])) }
    }

    #[inline]
    fn write_fsel(&self, index: usize, value: u32) {
        // SAFETY: as above.
        unsafe { ptr::write_volatile(ptr::addr_of_mut!((*self.regs.as_ptr()).fsel[index]), value) }
    }

    #[inline]
    fn write_set(&self, index: usize, mask: u32) {
        // SAFETY: as above.
        unsafe { ptr::write_volatile(ptr::addr_of_mut!((*self.regs.as_ptr()).set[index]), mask) }
    }

    #[inline]
    fn write_clr(&self, index: usize, mask: u32) {
        // SAFETY: as above.
        unsafe { ptr::write_volatile(ptr::addr_of_mut!((*self.regs.as_ptr()).clr[index]), mask) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_datasheet() {
        assert_eq!(REGISTER_BLOCK_LEN, 0x30);
        assert_eq!(core::mem::offset_of!(GpioRegisterMap, set), 0x1C);
        assert_eq!(core::mem::offset_of!(GpioRegisterMap, clr), 0x28);
    }

    #[test]
    fn test_fsel_position() {
        assert_eq!(fsel_position(0), (0, 0));
        assert_eq!(fsel_position(9), (0, 27));
        assert_eq!(fsel_position(18), (1, 24));
        assert_eq!(fsel_position(53), (5, 9));
    }

    #[test]
    fn test_level_position() {
        assert_eq!(level_position(18), (0, 1 << 18));
        assert_eq!(level_position(31), (0, 1 << 31));
        assert_eq!(level_position(32), (1, 1));
    }

    #[test]
    fn test_function_roundtrip_bits() {
        for f in [
            Function::Input,
            Function::Output,
            Function::Alt0,
            Function::Alt1,
            Function::Alt2,
            Function::Alt3,
            Function::Alt4,
            Function::Alt5,
        ] {
            assert_eq!(Function::from_bits(f as u32), f);
        }
    }

    #[test]
    fn test_simulated_bank_is_not_mapped() {
        assert!(!RegisterBank::simulated().is_mapped());
    }

    #[test]
    fn test_map_missing_device_fails() {
        let err = RegisterBank::map("/nonexistent/gpiomem", 0).err().unwrap();
        assert!(matches!(err, LedError::Map { .. }));
    }
}
