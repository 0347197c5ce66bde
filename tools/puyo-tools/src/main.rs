//! Tool for converting the files of older Puyo Puyo games to and from editable forms.

use anyhow::Result;

fn main() -> Result<()> {
    let invocation = puyo_tools::cli::get_invocation();

    let level = match invocation.verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    puyo_tools::run(&invocation.action)
}
