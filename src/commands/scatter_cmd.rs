//! `psstr` — materialize a scattered string descriptor

use super::args::ParsedArgs;
use super::Session;
use crate::core::types::{ProbeError, ProbeResult};
use crate::render::LineSink;
use crate::resolve::ContainerResolver;
use crate::scatter::{self, ScatterFormat};
use std::str::FromStr;

const VALUED: &[&str] = &["--format"];
const BOOLEAN: &[&str] = &[];

pub fn run(session: &mut Session<'_>, tokens: &[String], sink: &mut dyn LineSink) -> ProbeResult<()> {
    let parsed = ParsedArgs::parse(tokens, VALUED, BOOLEAN)?;

    let Some(expr) = parsed.positionals().first() else {
        return Err(ProbeError::InvalidArgument(
            "usage: psstr <descriptor-expr> [--format str|hex|dec|bin]".into(),
        ));
    };

    let format = match parsed.get("--format") {
        Some(text) => ScatterFormat::from_str(text)?,
        None => ScatterFormat::default(),
    };

    let resolved = session.provider.resolve_expression(expr)?;
    let type_name = if resolved.is_pointer() {
        resolved
            .pointee()
            .ok_or_else(|| ProbeError::eval(expr, "pointer has no pointee type"))?
            .to_string()
    } else {
        resolved.type_name.clone()
    };
    let descriptor = resolved.object_address();
    if descriptor.is_null() {
        return Err(ProbeError::NullReference(format!("{expr} is null")));
    }

    let mut resolver = ContainerResolver::new(session.provider);
    scatter::emit(
        &mut resolver,
        session.reader,
        &session.target,
        descriptor,
        &type_name,
        format,
        session.config.limits.max_regions,
        "",
        sink,
    )
}
