//! Normalized error families
//!
//! A family is a named kind of normalized error with a fixed extension code.
//! The registry answers "is this class name a normalized error family?" for
//! configuration that refers to families by name.

use std::collections::BTreeMap;
use std::fmt;

/// Code used when neither an entry nor its family supplies one
pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";

/// Known normalized error families
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorFamily {
    Internal,
    UserInput,
    Validation,
    Syntax,
    Authentication,
    Forbidden,
    /// Caller-registered family
    Custom { name: String, code: String },
}

impl ErrorFamily {
    pub const BUILT_IN: [ErrorFamily; 6] = [
        ErrorFamily::Internal,
        ErrorFamily::UserInput,
        ErrorFamily::Validation,
        ErrorFamily::Syntax,
        ErrorFamily::Authentication,
        ErrorFamily::Forbidden,
    ];

    /// Class name used to refer to the family in configuration
    pub fn name(&self) -> &str {
        match self {
            ErrorFamily::Internal => "InternalError",
            ErrorFamily::UserInput => "UserInputError",
            ErrorFamily::Validation => "ValidationError",
            ErrorFamily::Syntax => "SyntaxError",
            ErrorFamily::Authentication => "AuthenticationError",
            ErrorFamily::Forbidden => "ForbiddenError",
            ErrorFamily::Custom { name, .. } => name,
        }
    }

    /// Extension code carried by errors of this family
    pub fn code(&self) -> &str {
        match self {
            ErrorFamily::Internal => INTERNAL_SERVER_ERROR,
            ErrorFamily::UserInput => "BAD_USER_INPUT",
            ErrorFamily::Validation => "GRAPHQL_VALIDATION_FAILED",
            ErrorFamily::Syntax => "GRAPHQL_PARSE_FAILED",
            ErrorFamily::Authentication => "UNAUTHENTICATED",
            ErrorFamily::Forbidden => "FORBIDDEN",
            ErrorFamily::Custom { code, .. } => code,
        }
    }
}

impl fmt::Display for ErrorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lookup of normalized error families by class name
#[derive(Debug, Clone)]
pub struct FamilyRegistry {
    families: BTreeMap<String, ErrorFamily>,
}

impl Default for FamilyRegistry {
    fn default() -> Self {
        let families = ErrorFamily::BUILT_IN
            .iter()
            .map(|family| (family.name().to_string(), family.clone()))
            .collect();
        Self { families }
    }
}

impl FamilyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom family; replaces any family with the same name
    pub fn register(mut self, name: impl Into<String>, code: impl Into<String>) -> Self {
        let name = name.into();
        let family = ErrorFamily::Custom {
            name: name.clone(),
            code: code.into(),
        };
        self.families.insert(name, family);
        self
    }

    pub fn lookup(&self, class_name: &str) -> Option<&ErrorFamily> {
        self.families.get(class_name)
    }

    /// Whether the class name denotes a normalized error family
    pub fn is_normalized_family(&self, class_name: &str) -> bool {
        self.families.contains_key(class_name)
    }
}
