//! Binary entrypoint for the Mika Discord bot.

use std::process::ExitCode;

use mika_bot::start_mika;

/// Start Mika: load configuration, serve liveness, connect to Discord.
fn main() -> ExitCode {
    start_mika::run()
}
