use owo_colors::{OwoColorize, Stream};

use docpy::errors::{Diagnostic, DiagnosticMessage, Level};

fn format_level(level: Level) -> String {
    match level {
        Level::Fatal => format!(
            "{}",
            "FATAL".if_supports_color(Stream::Stderr, |text| text.red())
        ),

        Level::Error => format!(
            "{}",
            "ERROR".if_supports_color(Stream::Stderr, |text| text.bright_red())
        ),

        Level::Warn => format!(
            "{}",
            "WARN ".if_supports_color(Stream::Stderr, |text| text.yellow())
        ),

        Level::Info => format!(
            "{}",
            "INFO ".if_supports_color(Stream::Stderr, |text| text.bright_cyan())
        ),
    }
}

pub fn print_diagnostic(diagnostic: &Diagnostic) {
    let Diagnostic {
        level,
        message: DiagnosticMessage { span, message },
        source: _,
    } = diagnostic;

    let level = format_level(*level);

    match span {
        Some(span) => eprintln!("{} {} {}", level, span, message),
        None => eprintln!("{} {}", level, message),
    }
}
