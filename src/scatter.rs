//! Scattered strings: logical strings whose bytes live in a linked chain
//! of fixed-size buffer regions
//!
//! A descriptor is a `(buffer chain, start, len)` triple indexing into the
//! logical concatenation of the chain's regions. Descriptors never own or
//! mutate the chain; materializing one is a pure sequence of bounded reads.

use crate::core::types::{Address, ProbeError, ProbeResult};
use crate::decode;
use crate::provider::{read_pointer, MemoryReader, TargetLayout, TypeLayoutProvider};
use crate::render::LineSink;
use crate::resolve::ContainerResolver;
use std::str::FromStr;
use tracing::debug;

/// Rendering format for a materialized scattered string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScatterFormat {
    #[default]
    Str,
    Hex,
    Dec,
    Bin,
}

impl FromStr for ScatterFormat {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "str" => Ok(ScatterFormat::Str),
            "hex" => Ok(ScatterFormat::Hex),
            "dec" => Ok(ScatterFormat::Dec),
            "bin" => Ok(ScatterFormat::Bin),
            other => Err(ProbeError::InvalidArgument(format!(
                "unknown format: {other} (expected str, hex, dec or bin)"
            ))),
        }
    }
}

/// Where the descriptor's bytes actually live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScatterSource {
    /// The descriptor holds its bytes inline in a `data` member
    Direct { data: Address, len: u64 },
    /// The descriptor references a region chain through `buff`
    Chained {
        head: Address,
        start: u64,
        len: u64,
        region_type: String,
    },
}

/// The emitted rendering request: print `len` bytes starting at `start`
/// from the flattened region chain (or the inline data).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScatterRequest {
    pub source: ScatterSource,
    pub format: ScatterFormat,
}

impl ScatterRequest {
    /// One-line description of the request, printed before the content.
    pub fn describe(&self) -> String {
        match &self.source {
            ScatterSource::Direct { data, len } => {
                format!("print {len} bytes inline at {data}")
            }
            ScatterSource::Chained {
                head,
                start,
                len,
                region_type,
            } => format!("print {len} bytes from offset {start} of {region_type} chain at {head}"),
        }
    }
}

/// Reads a scalar member (offset + size already resolved) as an unsigned
/// integer in the target's byte order.
fn read_scalar<M: MemoryReader + ?Sized>(
    reader: &M,
    address: Address,
    size: usize,
    target: &TargetLayout,
) -> ProbeResult<u64> {
    let bytes = reader.read_bytes(address, size.min(8))?;
    if bytes.is_empty() {
        return Err(ProbeError::NoData);
    }
    Ok(match target.byte_order {
        crate::core::types::ByteOrder::Little => decode::le_value(bytes.as_slice()),
        crate::core::types::ByteOrder::Big => decode::be_value(bytes.as_slice()),
    })
}

/// Inspects a descriptor and emits the rendering request for it.
///
/// A null `buff` reference is `NullReference`: an unset scattered string is
/// valid domain state, and no further field access is attempted.
pub fn analyze<P, M>(
    resolver: &mut ContainerResolver<'_, P>,
    reader: &M,
    target: &TargetLayout,
    descriptor: Address,
    type_name: &str,
    format: ScatterFormat,
) -> ProbeResult<ScatterRequest>
where
    P: TypeLayoutProvider + ?Sized,
    M: MemoryReader + ?Sized,
{
    let ty = resolver.lookup_type(type_name)?;

    if ty.has_member("data") {
        let data = ty.member("data")?.clone();
        let len = if ty.has_member("len") {
            let len_member = ty.member("len")?;
            read_scalar(reader, descriptor.add(len_member.offset), len_member.size, target)?
        } else {
            data.size as u64
        };
        return Ok(ScatterRequest {
            source: ScatterSource::Direct {
                data: descriptor.add(data.offset),
                len,
            },
            format,
        });
    }

    let buff = ty.member("buff")?.clone();
    let head = read_pointer(
        reader,
        descriptor.add(buff.offset),
        target.pointer_size,
        target.byte_order,
    )?;
    if head.is_null() {
        return Err(ProbeError::NullReference(format!(
            "{type_name}.buff at {descriptor} is null"
        )));
    }

    let start_member = ty.member("start")?;
    let start = read_scalar(reader, descriptor.add(start_member.offset), start_member.size, target)?;
    let len_member = ty.member("len")?;
    let len = read_scalar(reader, descriptor.add(len_member.offset), len_member.size, target)?;

    let region_type = buff
        .type_name
        .trim_end()
        .strip_suffix('*')
        .map(str::trim)
        .ok_or_else(|| {
            ProbeError::Unsupported(format!(
                "{type_name}.buff is not a pointer ({})",
                buff.type_name
            ))
        })?
        .to_string();

    debug!(%descriptor, %head, start, len, %region_type, "scattered string analyzed");

    Ok(ScatterRequest {
        source: ScatterSource::Chained {
            head,
            start,
            len,
            region_type,
        },
        format,
    })
}

/// Materializes the raw bytes a request designates.
///
/// The chain walk is bounded by `max_regions`; a chain that ends before
/// `start + len` bytes have been seen violates the descriptor invariant and
/// is reported as a fault.
pub fn materialize<P, M>(
    resolver: &mut ContainerResolver<'_, P>,
    reader: &M,
    target: &TargetLayout,
    request: &ScatterRequest,
    max_regions: usize,
) -> ProbeResult<Vec<u8>>
where
    P: TypeLayoutProvider + ?Sized,
    M: MemoryReader + ?Sized,
{
    match &request.source {
        ScatterSource::Direct { data, len } => {
            if *len == 0 {
                return Ok(Vec::new());
            }
            Ok(reader.read_bytes(*data, *len as usize)?.into_vec())
        }
        ScatterSource::Chained {
            head,
            start,
            len,
            region_type,
        } => {
            let region_ty = resolver.lookup_type(region_type)?;
            let next = region_ty.member("next")?.clone();
            let data = region_ty.member("data")?.clone();
            let capacity = data.size as u64;
            if capacity == 0 {
                return Err(ProbeError::Unsupported(format!(
                    "{region_type}.data has zero capacity"
                )));
            }

            let mut out = Vec::with_capacity(*len as usize);
            let mut skip = *start;
            let mut remaining = *len;
            let mut current = *head;
            let mut regions = 0usize;

            while remaining > 0 {
                if current.is_null() {
                    return Err(ProbeError::read_fault(
                        *head,
                        *len as usize,
                        format!("region chain ended with {remaining} bytes outstanding"),
                    ));
                }
                if regions >= max_regions {
                    return Err(ProbeError::BudgetExceeded {
                        visited: regions,
                        budget: max_regions,
                    });
                }

                if skip >= capacity {
                    skip -= capacity;
                } else {
                    let take = (capacity - skip).min(remaining);
                    let bytes =
                        reader.read_bytes(current.add(data.offset + skip), take as usize)?;
                    out.extend_from_slice(bytes.as_slice());
                    remaining -= take;
                    skip = 0;
                }

                current = read_pointer(
                    reader,
                    current.add(next.offset),
                    target.pointer_size,
                    target.byte_order,
                )?;
                regions += 1;
            }

            Ok(out)
        }
    }
}

/// Renders materialized bytes in the requested format.
pub fn render(format: ScatterFormat, bytes: &[u8]) -> String {
    match format {
        ScatterFormat::Str => format!("\"{}\"", String::from_utf8_lossy(bytes)),
        ScatterFormat::Hex => decode::hex_string(bytes),
        ScatterFormat::Dec => decode::dec_string(bytes),
        ScatterFormat::Bin => decode::bin_string(bytes),
    }
}

/// Analyze + materialize + render into the sink, converting the
/// informational null-`buff` condition into a note instead of a failure.
pub fn emit<P, M>(
    resolver: &mut ContainerResolver<'_, P>,
    reader: &M,
    target: &TargetLayout,
    descriptor: Address,
    type_name: &str,
    format: ScatterFormat,
    max_regions: usize,
    indent: &str,
    sink: &mut dyn LineSink,
) -> ProbeResult<()>
where
    P: TypeLayoutProvider + ?Sized,
    M: MemoryReader + ?Sized,
{
    let request = match analyze(resolver, reader, target, descriptor, type_name, format) {
        Ok(request) => request,
        Err(err) if err.is_informational() => {
            sink.line(&format!("{indent}<unset scattered string: {err}>"));
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    sink.line(&format!("{indent}{}", request.describe()));
    let bytes = materialize(resolver, reader, target, &request, max_regions)?;
    sink.line(&format!("{indent}{}", render(format, &bytes)));
    Ok(())
}
