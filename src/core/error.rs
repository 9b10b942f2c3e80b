use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigMissingKey,
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationInvalidArgument,

    NetworkRequestFailed,
    NetworkInvalidResponse,

    ManifestVersionNotFound,

    GeneratorFailed,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigMissingKey => "config.missing_key",
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::NetworkRequestFailed => "network.request_failed",
            ErrorCode::NetworkInvalidResponse => "network.invalid_response",

            ErrorCode::ManifestVersionNotFound => "manifest.version_not_found",

            ErrorCode::GeneratorFailed => "generator.failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMissingKeyDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDetails {
    pub url: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionNotFoundDetails {
    pub versions: Vec<String>,
    pub manifest_url: String,
}

/// Captured result of a failed external generator run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorFailedDetails {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// A successful export whose output lacks an expected subtree.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorOutputMissingDetails {
    pub missing: String,
    pub output_dir: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
    ) -> Self {
        let problem = problem.into();
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.clone(),
            id,
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            format!("Invalid argument: {}", problem),
            details,
        )
    }

    pub fn config_missing_key(key: impl Into<String>, path: Option<String>) -> Self {
        let details = to_details(ConfigMissingKeyDetails {
            key: key.into(),
            path,
        });

        Self::new(
            ErrorCode::ConfigMissingKey,
            "Missing required configuration key",
            details,
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = to_details(ConfigInvalidJsonDetails {
            path: path.into(),
            error: err.to_string(),
        });

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let problem = problem.into();
        let details = to_details(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.clone(),
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid configuration value: {}", problem),
            details,
        )
    }

    pub fn network_request_failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        let url = url.into();
        let details = to_details(NetworkDetails {
            url: url.clone(),
            error: error.into(),
            status: None,
        });

        let mut err = Self::new(
            ErrorCode::NetworkRequestFailed,
            format!("Request to {} failed", url),
            details,
        );
        err.retryable = Some(true);
        err
    }

    pub fn network_invalid_response(
        url: impl Into<String>,
        status: Option<u16>,
        error: impl Into<String>,
    ) -> Self {
        let url = url.into();
        let details = to_details(NetworkDetails {
            url: url.clone(),
            error: error.into(),
            status,
        });

        Self::new(
            ErrorCode::NetworkInvalidResponse,
            format!("Invalid response from {}", url),
            details,
        )
    }

    pub fn manifest_version_not_found(versions: Vec<String>, manifest_url: impl Into<String>) -> Self {
        let message = format!("Versions not found in manifest: {}", versions.join(", "));
        let details = to_details(VersionNotFoundDetails {
            versions,
            manifest_url: manifest_url.into(),
        });

        Self::new(ErrorCode::ManifestVersionNotFound, message, details)
            .with_hint("Check the configured version identifiers against the release manifest")
    }

    pub fn generator_failed(message: impl Into<String>, details: GeneratorFailedDetails) -> Self {
        Self::new(ErrorCode::GeneratorFailed, message, to_details(details))
    }

    pub fn generator_output_missing(missing: impl Into<String>, output_dir: impl Into<String>) -> Self {
        let missing = missing.into();
        let message = format!("Data export produced no '{}' directory", missing);
        let details = to_details(GeneratorOutputMissingDetails {
            missing,
            output_dir: output_dir.into(),
        });

        Self::new(ErrorCode::GeneratorFailed, message, details)
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalJsonErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_io_carries_context_in_details() {
        let err = Error::internal_io("permission denied", Some("prune data".to_string()));

        assert_eq!(err.code.as_str(), "internal.io_error");
        assert_eq!(err.details["error"], "permission denied");
        assert_eq!(err.details["context"], "prune data");
    }

    #[test]
    fn generator_failed_serializes_captured_output() {
        let err = Error::generator_failed(
            "Data export for 1.21.4 failed",
            GeneratorFailedDetails {
                command: "java -jar 1.21.4.jar".to_string(),
                exit_code: Some(1),
                stdout: String::new(),
                stderr: "Exception in thread main".to_string(),
            },
        );

        assert_eq!(err.code, ErrorCode::GeneratorFailed);
        assert_eq!(err.details["exitCode"], 1);
        assert_eq!(err.details["stderr"], "Exception in thread main");
    }

    #[test]
    fn generator_output_missing_names_subtree_only() {
        let err = Error::generator_output_missing("reports", "/tmp/generated_1.20");

        assert_eq!(err.code, ErrorCode::GeneratorFailed);
        assert_eq!(err.details["missing"], "reports");
        assert_eq!(err.details["outputDir"], "/tmp/generated_1.20");
        assert!(err.details.get("exitCode").is_none());
        assert!(err.details.get("command").is_none());
    }

    #[test]
    fn manifest_version_not_found_lists_versions_and_hints() {
        let err = Error::manifest_version_not_found(
            vec!["9.9".to_string()],
            "https://example.invalid/manifest.json",
        );

        assert!(err.message.contains("9.9"));
        assert_eq!(err.hints.len(), 1);
    }
}
