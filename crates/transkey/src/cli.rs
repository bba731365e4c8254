//! Command-line interface definitions for transkey.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use logging::LogArgs;
use settings_store::Action;

/// Command-line interface for the `transkey` binary.
#[derive(Parser, Debug)]
#[command(
    name = "transkey",
    about = "Inspect and edit translation assistant settings",
    version
)]
pub struct Cli {
    /// Logging controls shared across transkey binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Settings file to use instead of `$TRANSKEY_SETTINGS` or the default location.
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Locale for default hotkey descriptions, e.g. `en-US` or `zh-CN`.
    #[arg(long, global = true, value_name = "LOCALE")]
    pub locale: Option<String>,

    /// What to do with the settings.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
///
/// Hotkey changes apply to the stored settings; the application registers
/// enabled hotkeys the next time it starts.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the current settings.
    Show,
    /// Record the translation backend to select at startup.
    SetBackend {
        /// Backend identifier.
        name: String,
    },
    /// Turn automatic translation on or off.
    AutoTranslate {
        /// New state.
        state: Toggle,
    },
    /// Change an action's key combo, e.g. `bind select ctrl+shift+t`.
    Bind {
        /// Action to rebind (`select` or `clip`).
        #[arg(value_parser = parse_action)]
        action: Action,
        /// New combo.
        combo: String,
    },
    /// Enable an action's hotkey.
    Enable {
        /// Action to enable.
        #[arg(value_parser = parse_action)]
        action: Action,
    },
    /// Disable an action's hotkey.
    Disable {
        /// Action to disable.
        #[arg(value_parser = parse_action)]
        action: Action,
    },
    /// Replace the settings with defaults.
    Reset,
}

/// An on/off switch argument.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Enabled.
    On,
    /// Disabled.
    Off,
}

impl Toggle {
    /// The switch as a boolean.
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

/// Parse an action name for clap.
fn parse_action(s: &str) -> Result<Action, String> {
    Action::from_name(s).ok_or_else(|| {
        let names: Vec<&str> = Action::ALL.iter().map(|a| a.name()).collect();
        format!("unknown action '{s}', expected one of: {}", names.join(", "))
    })
}
