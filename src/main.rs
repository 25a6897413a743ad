use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(err) = sales_forecast::app::run() {
        eprintln!("Error: {err}");
        return ExitCode::from(err.exit_code());
    }
    ExitCode::SUCCESS
}
