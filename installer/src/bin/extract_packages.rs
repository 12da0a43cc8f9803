//! Component extraction entrypoint.
//!
//! Expands the Javonet PHP SDK component archives into `javonet/` so the
//! PSR-4 autoloader can find them. Run it after `javonet-download-lfs`.

use clap::Parser;
use javonet_installer::cli::ExtractCli;
use javonet_installer::error::{InstallerError, Result};
use javonet_installer::extract_flow::run_extract;
use javonet_installer::output::{exit_code_for_run_result, init_logging};
use std::io::Write;

fn main() {
    init_logging();
    let cli = ExtractCli::parse();
    let mut stdout = std::io::stdout().lock();
    let run_result = run(&cli, &mut stdout);
    let mut stderr = std::io::stderr();
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &ExtractCli, out: &mut dyn Write) -> Result<()> {
    run_extract(cli.package_dir(), out)?;
    out.flush().map_err(|source| InstallerError::WriteFailed { source })
}
