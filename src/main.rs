use std::process::ExitCode;

use casedb::ui::output;

fn main() -> ExitCode {
    match casedb::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(&err);
            ExitCode::FAILURE
        }
    }
}
