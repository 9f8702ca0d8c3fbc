mod app;

use std::env;
use std::process::ExitCode;

use tracing::error;

fn main() -> ExitCode {
    app::init_tracing();
    let args = env::args().skip(1).collect::<Vec<_>>();
    match app::run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(error = %error, "quality_sim_failed");
            ExitCode::FAILURE
        }
    }
}
