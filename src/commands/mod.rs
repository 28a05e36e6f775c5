//! Command surface
//!
//! The embedding shell registers these by name and hands each invocation a
//! raw argument string. Every command either prints a complete, bounded
//! result or a clear diagnostic line; no error ever escapes into the
//! shell's own command loop.

pub mod args;
mod errno;
mod print_memory;
mod scatter_cmd;
mod walk_list;
mod walk_tree;
mod watch;

use crate::config::Config;
use crate::core::types::ProbeResult;
use crate::provider::{MemoryReader, TargetLayout, TypeLayoutProvider, WatchController};
use crate::render::LineSink;
use tracing::debug;

/// The collaborators one command invocation runs against.
///
/// Nothing here persists between invocations; each command constructs its
/// own resolver (and with it the offset cache) and drops it on return.
pub struct Session<'a> {
    pub provider: &'a dyn TypeLayoutProvider,
    pub reader: &'a dyn MemoryReader,
    pub watches: Option<&'a mut dyn WatchController>,
    pub config: &'a Config,
    pub target: TargetLayout,
}

impl<'a> Session<'a> {
    pub fn new(
        provider: &'a dyn TypeLayoutProvider,
        reader: &'a dyn MemoryReader,
        config: &'a Config,
        target: TargetLayout,
    ) -> Self {
        Session {
            provider,
            reader,
            watches: None,
            config,
            target,
        }
    }

    pub fn with_watches(mut self, watches: &'a mut dyn WatchController) -> Self {
        self.watches = Some(watches);
        self
    }
}

/// Dispatches one command line, converting every failure into printed
/// diagnostics.
pub fn dispatch(session: &mut Session<'_>, line: &str, sink: &mut dyn LineSink) {
    let tokens = args::split_args(line);
    let Some((name, rest)) = tokens.split_first() else {
        return;
    };
    debug!(command = %name, "dispatching");

    let result = run_command(session, name, rest, sink);
    if let Err(err) = result {
        if err.is_informational() {
            sink.line(&err.to_string());
        } else {
            sink.line(&format!("Error: {err}"));
        }
    }
}

fn run_command(
    session: &mut Session<'_>,
    name: &str,
    rest: &[String],
    sink: &mut dyn LineSink,
) -> ProbeResult<()> {
    match name {
        "pp" => print_memory::run(session, rest, sink),
        "ptlist" => walk_list::run(session, rest, sink),
        "pttree" => walk_tree::run(session, rest, sink),
        "psstr" => scatter_cmd::run(session, rest, sink),
        "perrno" => errno::run(session, sink),
        "watch" => watch::run(session, rest, sink),
        "help" => {
            help(sink);
            Ok(())
        }
        other => {
            sink.line(&format!(
                "unknown command: {other}. Type 'help' for available commands."
            ));
            Ok(())
        }
    }
}

fn help(sink: &mut dyn LineSink) {
    sink.line("pp <expr> [--size N]           print decoded memory at an expression");
    sink.line("pp --context [var]             print session context address/port pairs");
    sink.line("ptlist <head> [type member] [field ...]   walk a circular list");
    sink.line("    [--no-reverse] [--max-search N] [--max-print N] [--link-type T]");
    sink.line("pttree <root> [type member] [field ...]   walk a binary tree");
    sink.line("    [--raw] plus the ptlist options");
    sink.line("psstr <expr> [--format str|hex|dec|bin]   print a scattered string");
    sink.line("perrno                         show the current errno");
    sink.line("watch <expr>                   set a watch on an address");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotImage;

    #[test]
    fn test_unknown_command_reports() {
        let image = SnapshotImage::builder().build();
        let config = Config::default();
        let mut session = Session::new(&image, &image, &config, TargetLayout::default());
        let mut sink: Vec<String> = Vec::new();

        dispatch(&mut session, "frobnicate 0x1000", &mut sink);
        assert!(sink[0].starts_with("unknown command: frobnicate"));
    }

    #[test]
    fn test_errors_become_diagnostics() {
        let image = SnapshotImage::builder().build();
        let config = Config::default();
        let mut session = Session::new(&image, &image, &config, TargetLayout::default());
        let mut sink: Vec<String> = Vec::new();

        dispatch(&mut session, "ptlist no_such_symbol", &mut sink);
        assert_eq!(sink.len(), 1);
        assert!(sink[0].starts_with("Error:"));
    }

    #[test]
    fn test_empty_line_is_silent() {
        let image = SnapshotImage::builder().build();
        let config = Config::default();
        let mut session = Session::new(&image, &image, &config, TargetLayout::default());
        let mut sink: Vec<String> = Vec::new();

        dispatch(&mut session, "   ", &mut sink);
        assert!(sink.is_empty());
    }
}
