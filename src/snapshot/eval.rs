//! Expression evaluation over a snapshot image
//!
//! The live debugger owns real expression evaluation; this collaborator
//! only speaks the small grammar the commands themselves emit:
//! numeric literals, `name`, `name->a.b`, `name.a.b`, and `&` in front of
//! any of the symbol forms.

use super::SnapshotImage;
use crate::core::types::{pointee_of, Address, ProbeError, ProbeResult, ResolvedExpr};
use crate::provider::{read_pointer, MemoryReader};

pub(super) fn evaluate(image: &SnapshotImage, text: &str) -> ProbeResult<ResolvedExpr> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ProbeError::eval(text, "empty expression"));
    }

    let (take_address, body) = match trimmed.strip_prefix('&') {
        Some(rest) => (true, rest.trim()),
        None => (false, trimmed),
    };

    if body.starts_with(|c: char| c.is_ascii_digit()) {
        if take_address {
            return Err(ProbeError::eval(text, "cannot take the address of a literal"));
        }
        let value: Address = body
            .parse()
            .map_err(|_| ProbeError::eval(text, "malformed literal"))?;
        // A bare address designates raw bytes; no layout is implied.
        return Ok(ResolvedExpr {
            type_name: "u8 *".into(),
            address: Address::null(),
            value: value.as_u64(),
        });
    }

    let (base, deref, path) = match body.split_once("->") {
        Some((base, path)) => (base.trim(), true, Some(path)),
        None => match body.split_once('.') {
            Some((base, path)) => (base.trim(), false, Some(path)),
            None => (body, false, None),
        },
    };

    let symbol = image
        .symbol(base)
        .ok_or_else(|| ProbeError::eval(text, format!("no such symbol: {base}")))?;

    let target = image.target();
    let (mut address, mut type_name) = if deref {
        let pointee = pointee_of(&symbol.type_name)
            .ok_or_else(|| ProbeError::eval(text, format!("{base} is not a pointer")))?;
        let pointed = read_pointer(image, symbol.address, target.pointer_size, target.byte_order)?;
        if pointed.is_null() {
            return Err(ProbeError::eval(text, format!("{base} is null")));
        }
        (pointed, pointee.to_string())
    } else {
        (symbol.address, symbol.type_name.clone())
    };

    if let Some(path) = path {
        for part in path.split('.') {
            let descriptor = image
                .type_catalog()
                .get(type_name.as_str())
                .ok_or_else(|| ProbeError::UnknownType(type_name.clone()))?;
            let member = descriptor.member(part.trim())?;
            address = address.add(member.offset);
            type_name = member.type_name.clone();
        }
    }

    if take_address {
        return Ok(ResolvedExpr {
            type_name: format!("{type_name} *"),
            address: Address::null(),
            value: address.as_u64(),
        });
    }

    let value = value_at(image, address, &type_name)?;
    Ok(ResolvedExpr {
        type_name,
        address,
        value,
    })
}

/// Reads the scalar value stored at `address`, when the type has one.
///
/// Pointer reads must succeed (a command will follow the value); other
/// scalars degrade to zero when the storage is unreadable, since every
/// consumer of a non-pointer expression uses its address, not its value.
fn value_at(image: &SnapshotImage, address: Address, type_name: &str) -> ProbeResult<u64> {
    let target = image.target();
    if pointee_of(type_name).is_some() {
        return Ok(read_pointer(image, address, target.pointer_size, target.byte_order)?.as_u64());
    }

    let size = scalar_size(image, type_name);
    if size == 0 || size > 8 {
        return Ok(0);
    }
    match image.read_bytes(address, size) {
        Ok(bytes) => Ok(match target.byte_order {
            crate::core::types::ByteOrder::Little => crate::decode::le_value(bytes.as_slice()),
            crate::core::types::ByteOrder::Big => crate::decode::be_value(bytes.as_slice()),
        }),
        Err(_) => Ok(0),
    }
}

/// Size of a named scalar type, falling back to the catalog for typedefs.
fn scalar_size(image: &SnapshotImage, type_name: &str) -> usize {
    match type_name {
        "u8" | "i8" | "char" | "bool" | "unsigned char" => 1,
        "u16" | "i16" | "short" | "unsigned short" => 2,
        "u32" | "i32" | "int" | "unsigned int" => 4,
        "u64" | "i64" | "long" | "unsigned long" | "size_t" => 8,
        other => image.type_catalog().get(other).map(|t| t.size).unwrap_or(0),
    }
}
