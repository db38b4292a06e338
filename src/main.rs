use clap::Parser;
use portaudit::cli::{self, Args};
use portaudit::logging::{self, LogContext};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init(args.log_level) {
        eprintln!("error: unable to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let ctx = LogContext::new();

    match cli::execute(&args, &ctx).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
