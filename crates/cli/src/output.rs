//! Output formatting for CLI responses

use std::path::Path;

use anyhow::Error;
use colored::*;
use dfu_package::PackageWarning;
use dialoguer::Confirm;

use crate::error::CliError;

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    // Print error chain if available
    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

/// Frame `title` and `lines` in a box of `#`.
pub fn banner(title: &str, lines: &[&str]) -> String {
    let width = lines
        .iter()
        .map(|l| l.chars().count())
        .chain(std::iter::once(title.chars().count()))
        .max()
        .unwrap_or(0);
    let rule = "#".repeat(width + 4);

    let mut out = format!("{rule}\n# {title:<width$} #\n# {:<width$} #\n", "");
    for line in lines {
        out.push_str(&format!("# {line:<width$} #\n"));
    }
    out.push_str(&rule);
    out
}

/// Print a framed warning that is hard to miss.
pub fn print_banner(title: &str, lines: &[&str]) {
    eprintln!("{}", banner(title, lines).yellow().bold());
}

/// Banner for a signing key whose private half is published.
pub fn print_insecure_key_banner() {
    print_banner(
        "WARNING: INSECURE KEY",
        &[
            "The signing key is a known development key.",
            "Anyone can sign firmware that bootloaders built with its",
            "public key will accept. Do not use it in production.",
        ],
    );
}

/// Banners for the warnings raised while assembling a package.
pub fn print_package_warnings(warnings: &[PackageWarning]) {
    for warning in warnings {
        match warning {
            PackageWarning::DebugMode => print_banner(
                "WARNING: DEBUG MODE",
                &[
                    "This package is built in debug mode.",
                    "Version checks are skipped and unset versions default",
                    "to 0xFFFFFFFF. Only use it with debug bootloaders.",
                ],
            ),
            PackageWarning::Unsigned => print_banner(
                "WARNING: UNSIGNED PACKAGE",
                &[
                    "No key file was given, so the init packets are not signed.",
                    "Secure bootloaders will reject this package.",
                ],
            ),
            PackageWarning::InsecureKey => print_insecure_key_banner(),
        }
    }
}

/// Ask before replacing `path`. `yes` answers on the operator's behalf.
pub fn confirm_overwrite(path: &Path, yes: bool) -> Result<bool, CliError> {
    if yes || !path.exists() {
        return Ok(true);
    }
    Ok(Confirm::new()
        .with_prompt(format!("{} already exists. Overwrite?", path.display()))
        .default(false)
        .interact()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_pads_to_longest_line() {
        insta::assert_snapshot!(banner("WARNING", &["short", "a longer line"]), @r"
        #################
        # WARNING       #
        #               #
        # short         #
        # a longer line #
        #################
        ");
    }

    #[test]
    fn confirm_overwrite_skips_prompt_for_new_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::TempDir::new()?;
        assert!(confirm_overwrite(&dir.path().join("new.pem"), false)?);
        assert!(confirm_overwrite(dir.path(), true)?);
        Ok(())
    }
}
