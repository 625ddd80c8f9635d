use std::process::ExitCode;

fn main() -> ExitCode {
    match ads_dash::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("adash: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
