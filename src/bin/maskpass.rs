//! maskpass CLI - prompt for a secret with masked feedback
//!
//! Reads one line from the terminal without echoing it and either prints it
//! (for use from scripts) or reports how many characters were read.

use clap::Parser;
use std::io::{self, Write};
use std::process;

use maskpass::{InterruptPolicy, PromptOptions};
use maskpass::passphrase::{
    MaskedTerminalPassphraseReader, PassphraseReader, PromptOutput, ReaderPassphraseReader,
};

/// Exit status used by shells for SIGINT, reported when Ctrl+C cancels the prompt.
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser)]
#[command(name = "maskpass")]
#[command(version)]
#[command(about = "Read a secret from the terminal with masked feedback.", long_about = None)]
struct Cli {
    /// Text shown before the input
    #[arg(short, long, default_value = "Password: ")]
    prompt: String,

    /// Glyph echoed for every typed character
    #[arg(short, long, value_name = "CHAR", default_value_t = '*', conflicts_with = "no_mask")]
    mask: char,

    /// Echo nothing while typing
    #[arg(long)]
    no_mask: bool,

    /// Treat Ctrl+C as part of the secret instead of cancelling
    #[arg(long)]
    literal_interrupt: bool,

    /// Read one line from stdin instead of from the terminal
    #[arg(long)]
    stdin: bool,

    /// Write the secret to stdout
    #[arg(long)]
    print: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut reader = get_passphrase_reader(&cli);

    let secret = match reader.read_passphrase() {
        Ok(secret) => secret,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(if e.is_interrupted() { EXIT_INTERRUPTED } else { 1 });
        }
    };

    if cli.print {
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", secret.as_str()).and_then(|()| stdout.flush()) {
            eprintln!("Error: failed to write secret: {}", e);
            process::exit(1);
        }
    } else {
        eprintln!("read {} characters", secret.chars().count());
    }
}

fn get_passphrase_reader(cli: &Cli) -> Box<dyn PassphraseReader> {
    if cli.stdin {
        Box::new(ReaderPassphraseReader::new(Box::new(io::stdin())))
    } else {
        Box::new(terminal_reader(cli))
    }
}

/// Prompts go to stderr so that `--print` leaves nothing but the secret on stdout.
fn terminal_reader(cli: &Cli) -> MaskedTerminalPassphraseReader {
    MaskedTerminalPassphraseReader::new(cli.prompt.clone(), prompt_options(cli))
        .with_output(PromptOutput::Stderr)
}

fn prompt_options(cli: &Cli) -> PromptOptions {
    let options = if cli.no_mask {
        PromptOptions::unmasked()
    } else {
        PromptOptions::masked(cli.mask)
    };
    let interrupt = if cli.literal_interrupt {
        InterruptPolicy::Literal
    } else {
        InterruptPolicy::Cancel
    };
    options.with_interrupt_policy(interrupt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("maskpass").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_options() {
        let options = prompt_options(&parse(&[]));
        assert_eq!(options.mask, Some('*'));
        assert_eq!(options.interrupt, InterruptPolicy::Cancel);
    }

    #[test]
    fn test_custom_mask() {
        assert_eq!(prompt_options(&parse(&["-m", "#"])).mask, Some('#'));
        assert_eq!(prompt_options(&parse(&["--mask", "•"])).mask, Some('•'));
    }

    #[test]
    fn test_no_mask() {
        let options = prompt_options(&parse(&["--no-mask"]));
        assert_eq!(options.mask, None);
        assert_eq!(options.interrupt, InterruptPolicy::Cancel);
    }

    #[test]
    fn test_literal_interrupt() {
        let options = prompt_options(&parse(&["--literal-interrupt", "--no-mask"]));
        assert_eq!(options.mask, None);
        assert_eq!(options.interrupt, InterruptPolicy::Literal);
    }

    #[test]
    fn test_terminal_reader_prompts_on_stderr() {
        let reader = terminal_reader(&parse(&["--print", "--literal-interrupt"]));
        assert_eq!(reader.output(), PromptOutput::Stderr);
        assert_eq!(reader.options().interrupt, InterruptPolicy::Literal);
    }
}
