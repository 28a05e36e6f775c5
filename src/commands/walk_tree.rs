//! `pttree` — walk an intrusive binary tree

use super::args::ParsedArgs;
use super::walk_list::build_options;
use super::Session;
use crate::core::types::{ProbeError, ProbeResult};
use crate::render::LineSink;
use crate::walk::TreeWalker;

const VALUED: &[&str] = &["--max-search", "--max-print", "--link-type"];
const BOOLEAN: &[&str] = &["--no-reverse", "--raw"];

pub fn run(session: &mut Session<'_>, tokens: &[String], sink: &mut dyn LineSink) -> ProbeResult<()> {
    let parsed = ParsedArgs::parse(tokens, VALUED, BOOLEAN)?;

    let Some(root_expr) = parsed.positionals().first() else {
        return Err(ProbeError::InvalidArgument(
            "usage: pttree <root-expr> [container-type member] [field ...] \
             [--raw] [--no-reverse] [--max-search N] [--max-print N] [--link-type T]"
                .into(),
        ));
    };

    let default_link = session.config.types.tree_link.clone();
    let opts = build_options(session, &parsed, &default_link)?;
    if parsed.has("--raw") && opts.container.is_some() {
        return Err(ProbeError::InvalidArgument(
            "--raw draws link nodes only; drop the container arguments".into(),
        ));
    }

    let root = session.provider.resolve_expression(root_expr)?.object_address();

    let mut walker = TreeWalker::new(session.provider, session.reader, session.target);
    if parsed.has("--raw") {
        walker.walk_level_order(root, &opts, sink)?;
    } else {
        walker.walk_in_order(root, &opts, sink)?;
    }
    Ok(())
}
