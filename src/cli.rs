use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate text to Turkish and optionally score it against a reference
    Translate {
        /// Source text (any language); read from stdin when neither --text nor --file is given
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        /// File containing the source text
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Reference translation in Turkish
        #[arg(short, long, conflicts_with = "reference_file")]
        reference: Option<String>,

        /// File containing the reference translation
        #[arg(long)]
        reference_file: Option<PathBuf>,

        /// Detect the source language and pass explicit language tags
        #[arg(long)]
        detect_language: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List supported languages and their model tags
    Languages,

    /// Check that the translator and metric services are reachable
    Check,

    /// Write the default configuration to a file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_translate_arguments() {
        let args = Args::try_parse_from([
            "ceviri", "-v", "translate", "-t", "Hello, how are you?", "-r", "Merhaba, nasılsın?", "--json",
        ])
        .unwrap();
        assert!(args.verbose);
        match args.command {
            Commands::Translate { text, reference, json, detect_language, .. } => {
                assert_eq!(text.as_deref(), Some("Hello, how are you?"));
                assert_eq!(reference.as_deref(), Some("Merhaba, nasılsın?"));
                assert!(json);
                assert!(!detect_language);
            }
            _ => panic!("expected translate command"),
        }
    }

    #[test]
    fn test_text_and_file_conflict() {
        let result = Args::try_parse_from(["ceviri", "translate", "-t", "Hello", "-f", "in.txt"]);
        assert!(result.is_err());
    }
}
