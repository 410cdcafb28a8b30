#![doc = r#"
Chip memory

Responsibilities
- Flat byte store addressed by the plane pointers.
- Bump allocation for uploaded bitmaps; allocations are word aligned and never freed.

Reads outside the store return 0, matching open bus on unmapped addresses.
"#]

use super::EmulatorFault;

#[derive(Clone, Debug)]
pub struct ChipMemory {
    bytes: Vec<u8>,
    next: usize,
}

impl ChipMemory {
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
            next: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn free(&self) -> usize {
        self.bytes.len() - self.next
    }

    /// Copy `data` into fresh memory and return its address.
    pub fn upload(&mut self, data: &[u8]) -> Result<u32, EmulatorFault> {
        let len = (data.len() + 1) & !1;
        if len > self.free() {
            return Err(EmulatorFault::OutOfChipMemory {
                requested: data.len(),
                free: self.free(),
            });
        }
        let at = self.next;
        self.bytes[at..at + data.len()].copy_from_slice(data);
        self.next += len;
        log::debug!("[ChipMemory] Uploaded {} bytes at {:#07x}", data.len(), at);
        Ok(at as u32)
    }

    #[inline]
    pub fn read(&self, addr: u32) -> u8 {
        self.bytes.get(addr as usize).copied().unwrap_or(0)
    }
}
