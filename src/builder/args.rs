//! Build-time plugin options.
//!
//! The hosting release tooling hands pinpack one flat list of tokens. pinpack
//! recognizes a handful of options and passes everything else through to the
//! packaging tool unchanged, in order:
//!
//! ```text
//! -i puka --iteration 2 --deb-user root -d libssl1.0.0
//! └─ recognized ──────┘ └─ passed through to fpm ───┘
//! ```

use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser};

use crate::core::PinpackError;
use crate::packaging::PackageTarget;
use crate::pinning::PinStrategy;

/// The options pinpack recognizes.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "build-options", no_binary_name = true, disable_help_flag = true)]
pub struct BuildOptions {
    /// Only build direct dependencies matching this regex (repeatable)
    #[arg(long, short = 'i', action = ArgAction::Append)]
    pub include: Vec<String>,

    /// Buildout versions file with the [versions] pins
    #[arg(long)]
    pub versions_file: Option<PathBuf>,

    /// Iteration number for a hotfix release
    #[arg(long)]
    pub iteration: Option<String>,

    /// Declare dependencies as `= version`
    #[arg(long, conflicts_with = "pin_greater_or_equal")]
    pub pin_exact: bool,

    /// Declare dependencies as `>= version` (default)
    #[arg(long)]
    pub pin_greater_or_equal: bool,

    /// Package format to produce
    #[arg(long, short = 't', value_enum)]
    pub target: Option<PackageTarget>,
}

/// Parsed build arguments: recognized options plus pass-through tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildArgs {
    pub include: Vec<String>,
    pub versions_file: Option<PathBuf>,
    pub iteration: Option<String>,
    pub pin_strategy: PinStrategy,
    pub target: PackageTarget,
    /// Unrecognized tokens, verbatim and in order
    pub extra_args: Vec<String>,
}

impl BuildArgs {
    /// Split `tokens` into recognized options and pass-through arguments.
    ///
    /// # Errors
    ///
    /// [`PinpackError::InvalidArgument`] when a recognized option is malformed
    /// (missing value, unknown target, both pin strategies).
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, PinpackError> {
        let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        let (known, extra_args) = split_known_args(&tokens);

        let options = BuildOptions::try_parse_from(&known).map_err(|e| {
            let rendered = e.to_string();
            let reason = rendered.lines().next().unwrap_or_default();
            PinpackError::InvalidArgument {
                argument: known.join(" "),
                reason: reason.trim_start_matches("error: ").to_string(),
            }
        })?;

        Ok(Self {
            include: options.include,
            versions_file: options.versions_file,
            iteration: options.iteration,
            pin_strategy: if options.pin_exact {
                PinStrategy::Exact
            } else {
                PinStrategy::GreaterOrEqual
            },
            target: options.target.unwrap_or_default(),
            extra_args,
        })
    }
}

/// How a token relates to the recognized options.
enum Recognized {
    /// A recognized flag; `true` if the following token is its value
    Flag(bool),
    Unknown,
}

/// Partition `tokens` into `(recognized, pass_through)`, keeping order within each.
fn split_known_args(tokens: &[String]) -> (Vec<String>, Vec<String>) {
    let command = BuildOptions::command();
    let mut known = Vec::new();
    let mut unknown = Vec::new();
    let mut iter = tokens.iter();

    while let Some(token) = iter.next() {
        match recognize(&command, token) {
            Recognized::Flag(takes_next) => {
                known.push(token.clone());
                if takes_next {
                    if let Some(value) = iter.next() {
                        known.push(value.clone());
                    }
                }
            }
            Recognized::Unknown => unknown.push(token.clone()),
        }
    }

    (known, unknown)
}

fn recognize(command: &clap::Command, token: &str) -> Recognized {
    let takes_value = |arg: &clap::Arg| arg.get_action().takes_values();

    if let Some(long) = token.strip_prefix("--") {
        let (name, inline) = match long.split_once('=') {
            Some((name, _)) => (name, true),
            None => (long, false),
        };
        if name.is_empty() {
            return Recognized::Unknown;
        }
        return match command.get_arguments().find(|arg| arg.get_long() == Some(name)) {
            Some(arg) => Recognized::Flag(takes_value(arg) && !inline),
            None => Recognized::Unknown,
        };
    }

    if let Some(short) = token.strip_prefix('-') {
        let mut chars = short.chars();
        let Some(flag) = chars.next() else {
            return Recognized::Unknown;
        };
        let attached = !chars.as_str().is_empty();
        return match command.get_arguments().find(|arg| arg.get_short() == Some(flag)) {
            // `-ipuka` carries its value; `-iv` style bundles are not supported
            Some(arg) if takes_value(arg) => Recognized::Flag(!attached),
            Some(_) if !attached => Recognized::Flag(false),
            _ => Recognized::Unknown,
        };
    }

    Recognized::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = BuildArgs::parse::<&str>(&[]).unwrap();
        assert_eq!(args, BuildArgs::default());
        assert_eq!(args.target, PackageTarget::Deb);
        assert_eq!(args.pin_strategy, PinStrategy::GreaterOrEqual);
    }

    #[test]
    fn test_recognized_and_pass_through() {
        let args = BuildArgs::parse(&[
            "-i",
            "puka",
            "--deb-user",
            "root",
            "--include=^vdt",
            "--iteration",
            "2",
            "-d",
            "libssl1.0.0",
            "--versions-file",
            "pins.cfg",
        ])
        .unwrap();

        assert_eq!(args.include, ["puka", "^vdt"]);
        assert_eq!(args.iteration.as_deref(), Some("2"));
        assert_eq!(args.versions_file, Some(PathBuf::from("pins.cfg")));
        assert_eq!(args.extra_args, ["--deb-user", "root", "-d", "libssl1.0.0"]);
    }

    #[test]
    fn test_attached_short_value() {
        let args = BuildArgs::parse(&["-ipuka", "-trpm"]).unwrap();
        assert_eq!(args.include, ["puka"]);
        assert_eq!(args.target, PackageTarget::Rpm);
        assert!(args.extra_args.is_empty());
    }

    #[test]
    fn test_pin_strategy_and_target() {
        let args = BuildArgs::parse(&["--pin-exact", "--target", "wheel"]).unwrap();
        assert_eq!(args.pin_strategy, PinStrategy::Exact);
        assert_eq!(args.target, PackageTarget::Wheel);

        let args = BuildArgs::parse(&["--pin-greater-or-equal", "-t", "deb"]).unwrap();
        assert_eq!(args.pin_strategy, PinStrategy::GreaterOrEqual);
    }

    #[test]
    fn test_invalid_recognized_options() {
        for tokens in [
            vec!["--pin-exact", "--pin-greater-or-equal"],
            vec!["--target", "msi"],
            vec!["--iteration"],
        ] {
            let err = BuildArgs::parse(&tokens).unwrap_err();
            assert!(matches!(err, PinpackError::InvalidArgument { .. }), "{tokens:?}");
        }
    }

    #[test]
    fn test_unknown_long_options_pass_through() {
        let args = BuildArgs::parse(&["--", "--python-package-name-prefix=python3", "-"]).unwrap();
        assert_eq!(args.extra_args, ["--", "--python-package-name-prefix=python3", "-"]);
    }
}
