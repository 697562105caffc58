//! Signing key commands

use std::path::Path;

use anyhow::Result;
use dfu_crypto::{KeyFormat, KeyKind, SigningKey, render};
use dfu_image::write_atomically;
use tracing::info;

use crate::commands::{KeyCommands, KeyDisplayArgs, load_key_checked};
use crate::output;

/// Execute key command
pub fn execute(cmd: &KeyCommands) -> Result<()> {
    match cmd {
        KeyCommands::Generate { key_file, yes } => generate(key_file, *yes),
        KeyCommands::Display(args) => display(args),
    }
}

/// Generate a private key
fn generate(key_file: &Path, yes: bool) -> Result<()> {
    if !output::confirm_overwrite(key_file, yes)? {
        output::print_warning("Key generation cancelled");
        return Ok(());
    }

    let key = SigningKey::generate();
    let pem = key.to_pem()?;
    write_atomically(key_file, pem.as_bytes())?;
    info!(path = %key_file.display(), "generated signing key");

    output::print_success(&format!("Generated private key at {}", key_file.display()));
    Ok(())
}

/// Show one half of a key
fn display(args: &KeyDisplayArgs) -> Result<()> {
    let key = load_key_checked(&args.key_file)?;
    let kind = KeyKind::from(args.key);
    let format = KeyFormat::from(args.format);
    let rendered = render(&key, kind, format)?;

    if kind == KeyKind::Private {
        output::print_warning(
            "Displaying the private key. Keep it secret, anyone holding it can sign firmware.",
        );
    }

    match &args.out_file {
        Some(path) => {
            write_atomically(path, with_newline(rendered).as_bytes())?;
            output::print_success(&format!("Wrote {format} key to {}", path.display()));
        }
        None => print!("{}", with_newline(rendered)),
    }
    Ok(())
}

fn with_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_added_once() {
        assert_eq!(with_newline("abc".to_string()), "abc\n");
        assert_eq!(with_newline("abc\n".to_string()), "abc\n");
    }
}
