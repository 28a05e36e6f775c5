//! `watch` — install a watch on an address, delegated to the debugger

use super::Session;
use crate::core::types::{Address, ProbeError, ProbeResult};
use crate::render::LineSink;

pub fn run(session: &mut Session<'_>, tokens: &[String], sink: &mut dyn LineSink) -> ProbeResult<()> {
    let Some(expr) = tokens.first() else {
        return Err(ProbeError::InvalidArgument("usage: watch <expr>".into()));
    };

    let resolved = session.provider.resolve_expression(expr)?;
    let address = if resolved.address.is_null() {
        Address::new(resolved.value)
    } else {
        resolved.address
    };
    if address.is_null() {
        return Err(ProbeError::NullReference(format!("{expr} is null")));
    }

    match session.watches.as_deref_mut() {
        Some(controller) => {
            controller.set_watch(address)?;
            sink.line(&format!("Watch set at {address}"));
        }
        None => sink.line("watch is not supported by this debugger connection"),
    }
    Ok(())
}
