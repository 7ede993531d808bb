//! Error handling for hxdeps
//!
//! This module provides the strongly-typed error enum used across the crate and
//! the user-facing wrapper that renders errors with actionable suggestions.
//!
//! # Architecture
//!
//! - [`HxError`] - enumerated failure cases (toolchain, descriptor, library, installer)
//! - [`ErrorContext`] - wrapper adding a suggestion and details for CLI display
//!
//! Library code returns [`anyhow::Result`] and attaches context with
//! `.with_context(..)`; typed [`HxError`] values sit at the root of those
//! chains so callers can still downcast when they need to branch on a case.
//!
//! # Failure taxonomy
//!
//! - **Configuration absent**: [`HxError::SdkNotConfigured`], [`HxError::BuildFileNotFound`].
//!   These are reported once and resolution yields empty results.
//! - **Parse failure**: [`HxError::BuildFileParse`], [`HxError::ManifestParse`].
//!   Fatal for the single descriptor or library they concern.
//! - **Per-dependency failure**: [`HxError::LibraryNotFound`], [`HxError::LibraryNotInstalled`].
//!   Reported through the progress sink and skipped.
//! - **Subprocess failure**: [`HxError::InstallerFailed`], [`HxError::InstallerTimedOut`].
//!   Carry the trailing output lines of the process.
//!
//! # Examples
//!
//! ```rust,no_run
//! use hxdeps::core::{HxError, user_friendly_error};
//!
//! let err = anyhow::Error::from(HxError::SdkNotConfigured);
//! let ctx = user_friendly_error(err);
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Every typed failure hxdeps can produce.
#[derive(Error, Debug)]
pub enum HxError {
    /// No Haxe SDK is registered, configured for the project, or discoverable.
    #[error("No Haxe SDK configured or found on this system")]
    SdkNotConfigured,

    /// A named SDK was requested but is not in the registry.
    #[error("Haxe SDK '{name}' is not registered")]
    SdkNotRegistered {
        /// Name the project or command asked for
        name: String,
    },

    /// The SDK exists on disk but `haxe -version` did not produce a version.
    #[error("Haxe SDK at {path} is not a valid installation")]
    SdkInvalid {
        /// Install root of the rejected SDK
        path: String,
    },

    /// The library installer needs Neko, but none could be located.
    #[error("Neko VM not found (required by haxelib for SDK '{sdk}')")]
    NekoNotFound {
        /// Name of the SDK whose environment was being configured
        sdk: String,
    },

    /// No build file could be selected for the project.
    #[error("No build file found in project {project}")]
    BuildFileNotFound {
        /// Project root
        project: String,
    },

    /// The build file could not be parsed.
    #[error("Invalid build file {file}: {reason}")]
    BuildFileParse {
        /// Path to the build file
        file: String,
        /// Parser message
        reason: String,
    },

    /// `haxelib.json` is missing or malformed.
    #[error("Invalid haxelib manifest {file}: {reason}")]
    ManifestParse {
        /// Path to the manifest
        file: String,
        /// Parser message
        reason: String,
    },

    /// The library could not be located on disk or through its lockfile.
    #[error("Library '{name}' not found: {reason}")]
    LibraryNotFound {
        /// Library name
        name: String,
        /// What was looked for
        reason: String,
    },

    /// The installer reported success but the library is still not on disk.
    #[error("Library '{name}' is still missing after running haxelib install")]
    LibraryNotInstalled {
        /// Library name
        name: String,
    },

    /// `haxelib install` exited unsuccessfully.
    #[error("haxelib install {library} failed ({status}){}", output_suffix(.output))]
    InstallerFailed {
        /// Library being installed
        library: String,
        /// Exit status description
        status: String,
        /// Trailing output lines of the installer
        output: String,
    },

    /// `haxelib install` did not finish in time and was terminated.
    #[error("haxelib install {library} timed out after {seconds}s{}", output_suffix(.output))]
    InstallerTimedOut {
        /// Library being installed
        library: String,
        /// Timeout that elapsed
        seconds: u64,
        /// Trailing output lines of the installer
        output: String,
    },

    /// The operation was cancelled through the progress sink.
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration file error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// Installer output appended to an error message on its own lines.
fn output_suffix(output: &str) -> String {
    if output.trim().is_empty() { String::new() } else { format!("\n{}", output.trim_end()) }
}

/// An [`HxError`] with an optional suggestion and details for the user.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: HxError,
    /// What the user can do about it
    pub suggestion: Option<String>,
    /// Extra background
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error without suggestion or details.
    #[must_use]
    pub const fn new(error: HxError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with suggestions where we know them.
///
/// Typed [`HxError`] values anywhere in the chain get a tailored suggestion;
/// everything else is rendered with its full cause chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let chain = render_chain(&error);

    match error.downcast::<HxError>() {
        Ok(hx_error) => create_error_context(hx_error),
        Err(error) => {
            if let Some(io_error) = error.downcast_ref::<std::io::Error>()
                && io_error.kind() == std::io::ErrorKind::PermissionDenied
            {
                return ErrorContext::new(HxError::Other {
                    message: chain,
                })
                .with_suggestion("Check file ownership and permissions of the project directory");
            }

            ErrorContext::new(HxError::Other {
                message: chain,
            })
        }
    }
}

fn render_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

fn create_error_context(error: HxError) -> ErrorContext {
    match error {
        HxError::SdkNotConfigured => ErrorContext::new(error)
            .with_suggestion(
                "Register an SDK with 'hxdeps sdk add <name> <path>' or set HAXEPATH",
            )
            .with_details("hxdeps looks at HAXEPATH first and then searches PATH for 'haxe'"),
        HxError::SdkNotRegistered {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("List registered SDKs with 'hxdeps sdk list'"),
        HxError::SdkInvalid {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check that 'haxe -version' runs from the SDK directory"),
        HxError::NekoNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Install Neko or set NEKOPATH to its install directory"),
        HxError::BuildFileNotFound {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Create build.hxml or project.xml, or pin one with 'hxdeps config set build_file <path>'",
        ),
        HxError::InstallerFailed {
            ..
        }
        | HxError::InstallerTimedOut {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run the same 'haxelib install' command manually to see the full output"),
        other => ErrorContext::new(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_display() {
        let err = HxError::LibraryNotFound {
            name: "tink_core".to_string(),
            reason: "no lockfile".to_string(),
        };
        assert_eq!(err.to_string(), "Library 'tink_core' not found: no lockfile");
    }

    #[test]
    fn test_user_friendly_error_keeps_installer_output() {
        let err = anyhow::Error::from(HxError::InstallerFailed {
            library: "format".to_string(),
            status: "exit status: 1".to_string(),
            output: "Error: No such library".to_string(),
        });
        let ctx = user_friendly_error(err);
        assert!(matches!(ctx.error, HxError::InstallerFailed { .. }));
        assert!(ctx.error.to_string().ends_with("\nError: No such library"));
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn test_user_friendly_error_through_context() {
        let err: anyhow::Result<()> = Err(HxError::SdkNotConfigured.into());
        let err = err.context("Resolving project").unwrap_err();
        let ctx = user_friendly_error(err);
        assert!(matches!(ctx.error, HxError::SdkNotConfigured));
    }

    #[test]
    fn test_user_friendly_error_generic_chain() {
        let err = anyhow::anyhow!("inner").context("outer");
        let ctx = user_friendly_error(err);
        let text = ctx.to_string();
        assert!(text.contains("outer"));
        assert!(text.contains("Caused by"));
        assert!(text.contains("inner"));
    }

    #[test]
    fn test_io_failure_travels_with_context() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = anyhow::Error::new(io).context("Failed to write settings: /p/.hxdeps/settings.toml");
        let ctx = user_friendly_error(err);
        assert!(matches!(ctx.error, HxError::Other { .. }));
        assert!(ctx.error.to_string().contains("settings.toml"));
        assert!(ctx.suggestion.unwrap().contains("permissions"));
    }
}
