use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use viera_cli::logging::init_logging;
use viera_cli::{run, usage, Args};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            println!("{}", usage());
            return ExitCode::from(1);
        }
    };

    if let Err(e) = args.validate() {
        eprintln!("{e}");
        println!("{}", usage());
        return ExitCode::from(e.exit_code() as u8);
    }

    if let Err(e) = init_logging(args.log_mode.into(), &args.log_level) {
        eprintln!("{e}");
        return ExitCode::from(1);
    }

    let mut stdout = std::io::stdout();
    match run(&args, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
