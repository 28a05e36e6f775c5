//! `pp` — print memory at an address expression in decoded forms

use super::args::ParsedArgs;
use super::Session;
use crate::config::defaults::AUTO_SIZE_CAP;
use crate::config::validate_size;
use crate::core::types::{Address, ProbeError, ProbeResult};
use crate::decode;
use crate::render::LineSink;
use crate::resolve::ContainerResolver;

const VALUED: &[&str] = &["--size"];
const BOOLEAN: &[&str] = &["--context"];

pub fn run(session: &mut Session<'_>, tokens: &[String], sink: &mut dyn LineSink) -> ProbeResult<()> {
    let parsed = ParsedArgs::parse(tokens, VALUED, BOOLEAN)?;

    if parsed.has("--context") {
        return session_context(session, parsed.positionals().first().map(String::as_str), sink);
    }

    let Some(expr) = parsed.positionals().first() else {
        return Err(ProbeError::InvalidArgument(
            "usage: pp <expr> [--size N] | pp --context [var]".into(),
        ));
    };

    let resolved = session.provider.resolve_expression(expr)?;
    let (address, type_name) = if resolved.is_pointer() {
        (
            Address::new(resolved.value),
            resolved.pointee().unwrap_or("u8").to_string(),
        )
    } else {
        sink.line(&format!(
            "Warning: {expr} is not a pointer, using its address instead"
        ));
        (resolved.address, resolved.type_name.clone())
    };

    let size = match parsed.get("--size") {
        Some(text) => {
            let size: usize = text.parse().map_err(|_| {
                ProbeError::InvalidArgument(format!("--size expects a number, got {text}"))
            })?;
            validate_size(size).map_err(|e| ProbeError::InvalidArgument(e.to_string()))?;
            size
        }
        None => match type_size(session, &type_name) {
            Some(size) => size.min(AUTO_SIZE_CAP),
            None => {
                sink.line(&format!(
                    "Note: size of {type_name} is unknown, defaulting to 4 bytes"
                ));
                4
            }
        },
    };

    // Address-like types are shown as their embedded IPv4 address and port
    // rather than a flat dump.
    if session.config.types.address_types.iter().any(|t| t == &type_name) {
        return ip_address_dump(session, address, &type_name, sink);
    }

    dump_range(session, address, size, sink)
}

/// Reads and dumps one byte range through the decoder.
fn dump_range(
    session: &Session<'_>,
    address: Address,
    size: usize,
    sink: &mut dyn LineSink,
) -> ProbeResult<()> {
    sink.line(&format!("++ read {size} bytes at {address}"));
    let bytes = session.reader.read_bytes(address, size)?;
    let decoded = decode::decode(&bytes)?;
    for line in decode::dump_lines(&decoded) {
        sink.line(&line);
    }
    Ok(())
}

/// `sa4.sin_addr` (4 bytes) and `sa4.sin_port` (2 bytes) of an address-like
/// structure.
fn ip_address_dump(
    session: &Session<'_>,
    base: Address,
    type_name: &str,
    sink: &mut dyn LineSink,
) -> ProbeResult<()> {
    let mut resolver = ContainerResolver::new(session.provider);
    for (path, size) in [("sa4.sin_addr", 4usize), ("sa4.sin_port", 2usize)] {
        let (offset, _member) = resolver.offset_of_path(type_name, path)?;
        sink.line(&format!("{type_name}.{path}:"));
        dump_range(session, base.add(offset), size, sink)?;
    }
    Ok(())
}

/// Session-context dump: source/destination address and port pairs in the
/// order of the latest revision. A failure on one pair stops the remainder.
fn session_context(
    session: &Session<'_>,
    var: Option<&str>,
    sink: &mut dyn LineSink,
) -> ProbeResult<()> {
    let var = var.unwrap_or(session.config.types.context_var.as_str());

    for which in ["src", "dst", "orig_src", "orig_dst"] {
        let addr_expr = format!("&{var}->{which}_addr.sa4.sin_addr");
        let port_expr = format!("&{var}->{which}_addr.sa4.sin_port");

        let outcome = (|| -> ProbeResult<String> {
            let port_target = session.provider.resolve_expression(&port_expr)?;
            let port_bytes = session
                .reader
                .read_bytes(Address::new(port_target.value), 2)?;
            let port = decode::be_value(port_bytes.as_slice());

            let addr_target = session.provider.resolve_expression(&addr_expr)?;
            let addr = Address::new(addr_target.value);
            let addr_bytes = session.reader.read_bytes(addr, 4)?;

            Ok(format!(
                "{which}_addr {addr}: {}    (Big-endian Port = {port})",
                decode::dec_string(addr_bytes.as_slice())
            ))
        })();

        match outcome {
            Ok(line) => sink.line(&line),
            Err(err) => {
                sink.line(&format!("Error: {err}"));
                break;
            }
        }
    }
    Ok(())
}

/// Size of a named type: builtins first, then the layout collaborator.
fn type_size(session: &Session<'_>, type_name: &str) -> Option<usize> {
    let builtin = match type_name {
        "u8" | "i8" | "char" | "bool" | "unsigned char" => Some(1),
        "u16" | "i16" | "short" | "unsigned short" => Some(2),
        "u32" | "i32" | "int" | "unsigned int" | "float" => Some(4),
        "u64" | "i64" | "long" | "unsigned long" | "size_t" | "double" => Some(8),
        _ => None,
    };
    builtin.or_else(|| {
        session
            .provider
            .lookup_type(type_name)
            .ok()
            .map(|t| t.size)
    })
}
