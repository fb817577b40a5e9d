//! Message execution pipeline: split, tokenize, hash, dispatch.

use crate::code::CommandCode;
use crate::error::ErrorCode;
use crate::registry::CommandRegistry;
use crate::tokenizer::{split_command, split_parameters, sub_commands, Keywords, Parameters};
use crate::trace::{TraceEvent, TraceSink};

/// Records `error` as the last error and runs the error handler.
pub fn raise_error<S, C, const N: usize, const T: usize, const M: usize>(
    registry: &CommandRegistry<S, C, N, T, M>,
    last_error: &mut ErrorCode,
    error: ErrorCode,
    keywords: &Keywords<'_, N>,
    parameters: &Parameters<'_, N>,
    stream: &mut S,
    trace: &mut dyn TraceSink,
) where
    C: CommandCode,
{
    *last_error = error;
    trace.on_event(TraceEvent::ErrorRaised { error });
    (registry.error_handler())(keywords, parameters, stream);
}

/// Executes every `;`-separated sub-command of `message`, left to right.
///
/// Each sub-command is hashed from the root; the registry's tree base is
/// reset to root first. A sub-command whose keywords match no token raises
/// [`ErrorCode::UnknownCommand`] with the parsed sequences and execution
/// moves on to the next one. A valid code that no entry carries is skipped
/// silently.
pub fn execute_message<S, C, const N: usize, const T: usize, const M: usize>(
    registry: &mut CommandRegistry<S, C, N, T, M>,
    last_error: &mut ErrorCode,
    message: &[u8],
    stream: &mut S,
    trace: &mut dyn TraceSink,
) where
    C: CommandCode,
{
    *last_error = ErrorCode::NoError;

    for sub_command in sub_commands(message) {
        registry.reset_tree_base();
        let (keywords, tail) = split_command::<N>(sub_command);
        let parameters = split_parameters::<N>(tail);

        let code = registry.code_of(keywords.as_slice());
        if code == C::UNKNOWN {
            raise_error(
                registry,
                last_error,
                ErrorCode::UnknownCommand,
                &keywords,
                &parameters,
                stream,
                trace,
            );
            continue;
        }

        match registry.position(code) {
            Some(entry) => {
                trace.on_event(TraceEvent::CommandDispatched {
                    code: code.widen(),
                    entry,
                });
                let handler = registry.entries()[entry].handler;
                handler(&keywords, &parameters, stream);
            }
            None => trace.on_event(TraceEvent::CommandUnmatched { code: code.widen() }),
        }
    }
}
