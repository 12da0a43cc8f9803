//! Git LFS download entrypoint.
//!
//! Replaces the Git LFS pointer files in an installed Javonet PHP SDK with
//! the archives published for the installed version. Intended to run from a
//! Composer `post-install-cmd` or `post-update-cmd` script.

use clap::Parser;
use javonet_installer::cli::DownloadCli;
use javonet_installer::download_flow::{DownloadConfig, run_download};
use javonet_installer::error::{InstallerError, Result};
use javonet_installer::output::{exit_code_for_run_result, init_logging};
use std::io::Write;

fn main() {
    init_logging();
    let cli = DownloadCli::parse();
    let mut stdout = std::io::stdout().lock();
    let run_result = run(&cli, &mut stdout);
    let mut stderr = std::io::stderr();
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &DownloadCli, out: &mut dyn Write) -> Result<()> {
    let lock_file = cli.lock_file_path();
    let config = DownloadConfig {
        package_dir: &cli.package_dir,
        lock_file: &lock_file,
        repository_url: &cli.repository_url,
    };
    run_download(&config, out)?;
    out.flush().map_err(|source| InstallerError::WriteFailed { source })
}
