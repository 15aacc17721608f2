// ABOUTME: Error types for log parsing, conversion and device-directory sync
// ABOUTME: Conversion failures are fatal per file; degraded interpolation is not an error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ambitsync contributors

/// Errors that abort a single log-to-GPX conversion.
///
/// A conversion either fully succeeds (a valid GPX file is written) or fails
/// with one of these; no partial output artifact is ever left behind.
/// Recoverable conditions (lap interpolation falling back to 0, heart-rate
/// estimates outside the physiological range) are handled in place and
/// surfaced as `tracing` warnings, never as errors.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A structurally required element is absent from the input document
    #[error("malformed input: required element '{element}' is missing")]
    MalformedInput {
        /// Name of the missing element
        element: &'static str,
    },

    /// The header names an activity type outside the fixed mapping table
    #[error("unknown activity type '{name}'")]
    UnknownActivityType {
        /// Activity type name as found in the log header
        name: String,
    },

    /// The input document is not well-formed XML
    #[error("failed to read log XML")]
    Xml {
        /// Underlying XML error
        #[from]
        source: quick_xml::Error,
    },

    /// Reading the input or writing the output failed
    #[error("I/O error during conversion")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

/// Result type alias for conversion operations
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors from staging device logs and batch-converting them.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The Openambit sync directory could not be located
    #[error("no device sync directory found (set OPENAMBIT_DIR or create ~/.openambit)")]
    NoDeviceDir,

    /// Walking or copying files failed
    #[error("I/O error while staging logs")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// Converting a staged log failed
    #[error("failed to convert '{path}'")]
    Convert {
        /// Log file that failed to convert
        path: String,
        /// Underlying conversion error
        #[source]
        source: ConvertError,
    },
}
