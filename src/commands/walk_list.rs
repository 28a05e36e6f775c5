//! `ptlist` — walk a circular doubly-linked list

use super::args::ParsedArgs;
use super::Session;
use crate::core::types::{ProbeError, ProbeResult};
use crate::render::LineSink;
use crate::walk::{ContainerSpec, ListWalker, WalkOptions};

const VALUED: &[&str] = &["--max-search", "--max-print", "--link-type"];
const BOOLEAN: &[&str] = &["--no-reverse"];

pub fn run(session: &mut Session<'_>, tokens: &[String], sink: &mut dyn LineSink) -> ProbeResult<()> {
    let parsed = ParsedArgs::parse(tokens, VALUED, BOOLEAN)?;
    let positionals = parsed.positionals();

    let Some(head_expr) = positionals.first() else {
        return Err(ProbeError::InvalidArgument(
            "usage: ptlist <head-expr> [container-type member] [field ...] \
             [--no-reverse] [--max-search N] [--max-print N] [--link-type T]"
                .into(),
        ));
    };

    let default_link = session.config.types.list_link.clone();
    let opts = build_options(session, &parsed, &default_link)?;

    let head = session.provider.resolve_expression(head_expr)?.object_address();
    if head.is_null() {
        return Err(ProbeError::NullReference(format!("{head_expr} is null")));
    }

    let mut walker = ListWalker::new(session.provider, session.reader, session.target);
    walker.walk(head, &opts, sink)?;
    Ok(())
}

/// Shared option assembly for both traversal commands.
pub(super) fn build_options(
    session: &Session<'_>,
    parsed: &ParsedArgs,
    default_link: &str,
) -> ProbeResult<WalkOptions> {
    let positionals = parsed.positionals();

    let mut opts = WalkOptions::new(parsed.get("--link-type").unwrap_or(default_link));
    opts.reverse = !parsed.has("--no-reverse");
    opts.max_search = parsed.get_usize("--max-search", session.config.limits.max_search)?;
    opts.max_print = parsed.get_usize("--max-print", session.config.limits.max_print)?;
    opts.scatter_type = session.config.types.scatter.clone();
    opts.max_regions = session.config.limits.max_regions;

    if opts.max_search == 0 || opts.max_print == 0 {
        return Err(ProbeError::InvalidArgument(
            "--max-search and --max-print must be at least 1".into(),
        ));
    }

    opts.container = match positionals.len() {
        0 | 1 => None,
        2 => {
            return Err(ProbeError::InvalidArgument(
                "a container type requires a member name".into(),
            ))
        }
        _ => Some(ContainerSpec {
            type_name: positionals[1].clone(),
            member: positionals[2].clone(),
            fields: positionals[3..].to_vec(),
        }),
    };

    Ok(opts)
}
