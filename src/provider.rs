//! Collaborator interfaces to the hosting debugger
//!
//! The toolkit does not talk to a process directly. Layout resolution,
//! expression evaluation, raw memory access, and watch installation are all
//! owned by the debugger and consumed through the traits below.

use crate::core::types::{Address, ByteBuffer, ByteOrder, ProbeError, ProbeResult, ResolvedExpr, TypeDescriptor};

/// Resolves type layouts and address expressions.
pub trait TypeLayoutProvider {
    /// Returns the layout of a named type, or `UnknownType`.
    fn lookup_type(&self, name: &str) -> ProbeResult<TypeDescriptor>;

    /// Evaluates an address expression, or `EvalError`.
    fn resolve_expression(&self, text: &str) -> ProbeResult<ResolvedExpr>;
}

/// Reads raw bytes from the inspected process.
pub trait MemoryReader {
    /// Returns the bytes stored at `address`, or `ReadFault` if the range
    /// is unreachable. Reads are blocking round-trips and never retried.
    fn read_bytes(&self, address: Address, count: usize) -> ProbeResult<ByteBuffer>;
}

/// Installs a hardware/software watch on an address.
///
/// The single state-changing operation the toolkit ever requests; the
/// mechanism belongs entirely to the debugger.
pub trait WatchController {
    fn set_watch(&mut self, address: Address) -> ProbeResult<()>;
}

/// Pointer width and byte order of the inspected target.
///
/// These describe the target process, not the host this tool runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLayout {
    pub pointer_size: usize,
    pub byte_order: ByteOrder,
}

impl Default for TargetLayout {
    fn default() -> Self {
        TargetLayout {
            pointer_size: 8,
            byte_order: ByteOrder::Little,
        }
    }
}

/// Reads one target pointer out of process memory.
///
/// Pointer width and byte order come from the target configuration, not
/// from the host this tool happens to run on.
pub fn read_pointer<M: MemoryReader + ?Sized>(
    reader: &M,
    address: Address,
    pointer_size: usize,
    byte_order: ByteOrder,
) -> ProbeResult<Address> {
    if pointer_size == 0 || pointer_size > 8 {
        return Err(ProbeError::InvalidArgument(format!(
            "unsupported pointer size: {pointer_size}"
        )));
    }

    let bytes = reader.read_bytes(address, pointer_size)?;
    if bytes.len() < pointer_size {
        return Err(ProbeError::read_fault(
            address,
            pointer_size,
            format!("short read ({} bytes)", bytes.len()),
        ));
    }

    let mut value: u64 = 0;
    match byte_order {
        ByteOrder::Little => {
            for (i, &b) in bytes.iter().take(pointer_size).enumerate() {
                value |= (b as u64) << (8 * i);
            }
        }
        ByteOrder::Big => {
            for &b in bytes.iter().take(pointer_size) {
                value = (value << 8) | b as u64;
            }
        }
    }
    Ok(Address::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FlatReader(HashMap<u64, Vec<u8>>);

    impl MemoryReader for FlatReader {
        fn read_bytes(&self, address: Address, count: usize) -> ProbeResult<ByteBuffer> {
            self.0
                .get(&address.as_u64())
                .map(|b| ByteBuffer::from(&b[..count.min(b.len())]))
                .ok_or_else(|| ProbeError::read_fault(address, count, "unmapped"))
        }
    }

    #[test]
    fn test_read_pointer_little() {
        let mut mem = HashMap::new();
        mem.insert(0x1000, vec![0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]);
        let reader = FlatReader(mem);

        let ptr = read_pointer(&reader, Address::new(0x1000), 8, ByteOrder::Little).unwrap();
        assert_eq!(ptr, Address::new(0x1122334455667788));
    }

    #[test]
    fn test_read_pointer_big() {
        let mut mem = HashMap::new();
        mem.insert(0x1000, vec![0x11, 0x22, 0x33, 0x44]);
        let reader = FlatReader(mem);

        let ptr = read_pointer(&reader, Address::new(0x1000), 4, ByteOrder::Big).unwrap();
        assert_eq!(ptr, Address::new(0x11223344));
    }

    #[test]
    fn test_read_pointer_fault() {
        let reader = FlatReader(HashMap::new());
        let err = read_pointer(&reader, Address::new(0xBAD), 8, ByteOrder::Little).unwrap_err();
        assert!(matches!(err, ProbeError::ReadFault { .. }));
    }

    #[test]
    fn test_bad_pointer_size() {
        let reader = FlatReader(HashMap::new());
        assert!(read_pointer(&reader, Address::new(0), 16, ByteOrder::Little).is_err());
    }
}
