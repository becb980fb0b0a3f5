use std::process::ExitCode;

use docpy::errors::Diagnostics;
use docpy::source::{SourceBuffer, SourceMap};

use self::config::{parse_args_or_exit, DocpyConfig};
use self::errors::print_diagnostic;

pub mod config;
mod errors;
mod passes;

pub enum RunControl {
    Continue,
    Stop,
}

pub struct PassOutput<O> {
    pub output: O,
    pub control: RunControl,
}

impl<O> PassOutput<O> {
    pub fn stop_with_output(output: O) -> Self {
        Self {
            output,
            control: RunControl::Stop,
        }
    }

    pub fn continue_with_output(output: O) -> Self {
        Self {
            output,
            control: RunControl::Continue,
        }
    }
}

pub struct RunnerCtx<'buf, 'emt> {
    pub config: DocpyConfig,
    pub source: SourceMap<'buf>,
    pub diagnostics: Diagnostics<'emt>,
}

macro_rules! return_if_stopped {
    ($ctx:expr, $e:expr) => {
        match $e {
            PassOutput {
                control: RunControl::Stop,
                ..
            } => {
                return if $ctx.diagnostics.has_errors() {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            }

            PassOutput { output, .. } => output,
        }
    };
}

fn run(mut ctx: RunnerCtx<'_, '_>) -> ExitCode {
    let tree = return_if_stopped!(ctx, passes::build_docs(&mut ctx));
    let tree = return_if_stopped!(ctx, passes::dump_tree_if_asked(&mut ctx, tree));
    let rendered = return_if_stopped!(ctx, passes::render_output(&mut ctx, tree));
    return_if_stopped!(ctx, passes::write_output(&mut ctx, rendered));

    if ctx.diagnostics.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

pub fn prepare_and_run() -> ExitCode {
    let config = parse_args_or_exit();
    let mut source_buf = SourceBuffer::new();
    let source = SourceMap::new(&mut source_buf);

    let mut diagnostics = Diagnostics::new();
    diagnostics.set_emitter(Box::new(print_diagnostic));

    let ctx = RunnerCtx {
        config,
        source,
        diagnostics,
    };

    run(ctx)
}
