//! Shell completions generation command.
//!
//! ```bash
//! ib completions bash > ~/.local/share/bash-completion/completions/ib
//! ib completions zsh -o ~/.zsh/completions
//! ```

use crate::cli::{Cli, CompletionsArgs, ShellType};
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::{Shell, generate, generate_to};
use std::io;
use tracing::info;

const BIN_NAME: &str = "ib";

/// Execute the completions command.
///
/// With `--output` the script is written into that directory under the
/// shell's conventional file name.
///
/// # Errors
///
/// Returns an error if file I/O fails.
pub fn execute(args: &CompletionsArgs) -> Result<()> {
    info!(shell = ?args.shell, output = ?args.output, "generating shell completions");

    let mut cmd = Cli::command();
    let shell = convert_shell_type(args.shell);

    if let Some(output_dir) = &args.output {
        std::fs::create_dir_all(output_dir)?;
        let path = generate_to(shell, &mut cmd, BIN_NAME, output_dir)?;
        info!(path = %path.display(), "wrote completion script");
        eprintln!(
            "Generated {} completions to {}",
            shell_name(args.shell),
            path.display()
        );
        print_install_hint(args.shell);
    } else {
        generate(shell, &mut cmd, BIN_NAME, &mut io::stdout());
    }

    Ok(())
}

const fn convert_shell_type(shell: ShellType) -> Shell {
    match shell {
        ShellType::Bash => Shell::Bash,
        ShellType::Zsh => Shell::Zsh,
        ShellType::Fish => Shell::Fish,
        ShellType::PowerShell => Shell::PowerShell,
        ShellType::Elvish => Shell::Elvish,
    }
}

const fn shell_name(shell: ShellType) -> &'static str {
    match shell {
        ShellType::Bash => "bash",
        ShellType::Zsh => "zsh",
        ShellType::Fish => "fish",
        ShellType::PowerShell => "PowerShell",
        ShellType::Elvish => "elvish",
    }
}

fn print_install_hint(shell: ShellType) {
    let hint = match shell {
        ShellType::Bash => "# Source the file from ~/.bashrc, or copy it to ~/.local/share/bash-completion/completions/",
        ShellType::Zsh => "# Add the directory to fpath in ~/.zshrc: fpath=(<dir> $fpath)",
        ShellType::Fish => "# Copy the file to ~/.config/fish/completions/",
        ShellType::PowerShell => "# Dot-source the file from your $PROFILE",
        ShellType::Elvish => "# Copy the file to ~/.elvish/lib/ and add `use ib` to rc.elv",
    };
    eprintln!("{hint}");
}
