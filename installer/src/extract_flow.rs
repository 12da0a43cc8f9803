//! Component extraction flow.
//!
//! Expands each SDK component archive from the packages directory into its
//! own directory under `javonet/`, where the PHP autoloader expects it.

use camino::Utf8Path;
use log::{info, warn};
use std::io::Write;

use crate::artefact::extraction::{
    ArtefactExtractor, Expansion, ZipExtractor, count_files, expand_archive,
};
use crate::error::{InstallerError, Result};
use crate::lfs::scan::PACKAGES_DIR_NAME;
use crate::output::{pluralise, write_line};

/// Directory under the package directory that receives the components.
pub const COMPONENTS_DIR_NAME: &str = "javonet";

/// Pairs an archive file name with the component directory it expands into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveMapping {
    /// Archive file name inside the packages directory.
    pub archive: &'static str,
    /// Directory name under [`COMPONENTS_DIR_NAME`].
    pub component: &'static str,
}

/// The SDK component archives, in extraction order.
pub const ARCHIVE_MAPPINGS: &[ArchiveMapping] = &[
    ArchiveMapping {
        archive: "javonet-sdk.zip",
        component: "sdk",
    },
    ArchiveMapping {
        archive: "javonet-core.zip",
        component: "core",
    },
    ArchiveMapping {
        archive: "javonet-utils.zip",
        component: "utils",
    },
    ArchiveMapping {
        archive: "javonet-Binaries.zip",
        component: "binaries",
    },
];

/// Outcome of processing one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// The archive was expanded and the destination holds `files` files.
    Extracted {
        /// Regular files under the component directory.
        files: usize,
    },
    /// The archive does not exist.
    Missing,
    /// Extraction failed; `reason` is the rendered error.
    Failed {
        /// Human-readable failure description.
        reason: String,
    },
}

/// Per-archive entry of an [`ExtractSummary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// The mapping that was processed.
    pub mapping: ArchiveMapping,
    /// What happened to it.
    pub outcome: ArchiveOutcome,
}

/// What an extraction run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// One report per mapping, in processing order.
    pub reports: Vec<ArchiveReport>,
}

impl ExtractSummary {
    /// Number of archives that were extracted.
    #[must_use]
    pub fn extracted_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|report| matches!(report.outcome, ArchiveOutcome::Extracted { .. }))
            .count()
    }

    /// Number of archives the run processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.reports.len()
    }
}

/// Run the extraction flow for the SDK archives with the ZIP extractor.
///
/// # Errors
///
/// Returns [`InstallerError::PackageDirNotFound`] when the package directory
/// is missing, [`InstallerError::Io`] when the components directory cannot
/// be created, and [`InstallerError::NoArchivesExtracted`] when every archive
/// was missing or failed.
pub fn run_extract(package_dir: &Utf8Path, out: &mut dyn Write) -> Result<ExtractSummary> {
    run_extract_with(package_dir, &ZipExtractor, ARCHIVE_MAPPINGS, out)
}

/// Testable inner function with an injected extractor and mapping list.
///
/// # Errors
///
/// See [`run_extract`].
pub fn run_extract_with(
    package_dir: &Utf8Path,
    extractor: &dyn ArtefactExtractor,
    mappings: &[ArchiveMapping],
    out: &mut dyn Write,
) -> Result<ExtractSummary> {
    write_line(out, "Extracting Javonet component ZIP archives...");
    write_line(out, "");

    if !package_dir.is_dir() {
        return Err(InstallerError::PackageDirNotFound {
            path: package_dir.to_owned(),
        });
    }

    let components_dir = package_dir.join(COMPONENTS_DIR_NAME);
    if !components_dir.is_dir() {
        std::fs::create_dir_all(&components_dir)?;
        write_line(out, format_args!("Created directory: {components_dir}"));
    }

    let packages_dir = package_dir.join(PACKAGES_DIR_NAME);
    write_line(
        out,
        format_args!("Looking for ZIP archives in: {packages_dir}/"),
    );
    write_line(out, "");

    let mut summary = ExtractSummary::default();
    for mapping in mappings {
        let outcome = extract_one(mapping, &packages_dir, &components_dir, extractor, out);
        summary.reports.push(ArchiveReport {
            mapping: *mapping,
            outcome,
        });
    }

    let extracted = summary.extracted_count();
    let total = summary.total();
    info!("extraction run finished: {extracted}/{total} components");

    write_line(out, "Summary:");
    if extracted == 0 {
        write_line(out, "  No components were extracted!");
        write_line(out, "");
        return Err(InstallerError::NoArchivesExtracted { total });
    }
    write_line(
        out,
        format_args!("  Extracted {extracted}/{total} components!"),
    );
    write_line(out, "");

    report_structure(&components_dir, mappings, out);
    write_line(out, "");
    write_line(out, "Components are available through the PSR-4 autoloader:");
    write_line(out, "   - use sdk\\ClassName;");

    Ok(summary)
}

fn extract_one(
    mapping: &ArchiveMapping,
    packages_dir: &Utf8Path,
    components_dir: &Utf8Path,
    extractor: &dyn ArtefactExtractor,
    out: &mut dyn Write,
) -> ArchiveOutcome {
    let archive_path = packages_dir.join(mapping.archive);
    let dest = components_dir.join(mapping.component);
    write_line(
        out,
        format_args!("Processing: {} -> {}", mapping.archive, mapping.component),
    );

    let outcome = match expand_archive(extractor, &archive_path, &dest) {
        Ok(Expansion::Missing) => {
            write_line(out, format_args!("  Missing file: {}", mapping.archive));
            ArchiveOutcome::Missing
        }
        Ok(Expansion::Extracted { files }) => {
            write_line(out, format_args!("  Extracted to: {dest}"));
            write_line(
                out,
                format_args!("  Extracted: {}", pluralise(files, "file", "files")),
            );
            ArchiveOutcome::Extracted { files }
        }
        Err(e) => {
            warn!("extracting {archive_path} failed: {e}");
            write_line(out, format_args!("  Error: {e}"));
            ArchiveOutcome::Failed {
                reason: e.to_string(),
            }
        }
    };
    write_line(out, "");
    outcome
}

fn report_structure(components_dir: &Utf8Path, mappings: &[ArchiveMapping], out: &mut dyn Write) {
    write_line(out, "javonet structure:");
    for mapping in mappings {
        let dir = components_dir.join(mapping.component);
        if dir.is_dir() {
            write_line(
                out,
                format_args!(
                    "  javonet/{}/ ({})",
                    mapping.component, pluralise(count_files(&dir), "file", "files")
                ),
            );
        } else {
            write_line(
                out,
                format_args!("  javonet/{}/ (does not exist)", mapping.component),
            );
        }
    }
}

#[cfg(test)]
#[path = "extract_flow_tests.rs"]
mod tests;
