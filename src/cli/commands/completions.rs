//! Shell completion generation
//!
//! Generates shell completion scripts for bash, zsh, fish, and PowerShell.
//!
//! # Usage
//!
//! ```bash
//! # Bash - add to ~/.bashrc
//! source <(mfgdocs completions bash)
//!
//! # Zsh - add to ~/.zshrc
//! source <(mfgdocs completions zsh)
//!
//! # Fish - add to ~/.config/fish/completions/mfgdocs.fish
//! mfgdocs completions fish > ~/.config/fish/completions/mfgdocs.fish
//!
//! # PowerShell - add to $PROFILE
//! mfgdocs completions powershell >> $PROFILE
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::Result;
use std::io;

use crate::cli::Cli;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, bin_name, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_use_command_name() {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        let mut out = Vec::new();
        generate(Shell::Bash, &mut cmd, bin_name.as_str(), &mut out);

        assert_eq!(bin_name, "mfgdocs");
        assert!(String::from_utf8(out).unwrap().contains("_mfgdocs()"));
    }
}
