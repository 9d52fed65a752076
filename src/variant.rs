use crate::error::Error;
use crate::substitute::Substitution;

pub const PLACEHOLDER_PREFIX: &str = "##";

pub const PROJECT_ID: &[&str] = &["##PROJECT_ID"];

pub const MONGO: &[&str] = &[
    "##EMAIL",
    "##PASSWORD",
    "##SITE_URL",
    "##SECRET",
    "##ELECTION_YEAR",
    "##UPDATE_PROFILE",
    "##DB_NAME",
    "##DB_URL",
];

pub const APP_ENGINE: &[&str] = &[
    "##PROJECT_ID",
    "##EMAIL",
    "##PASSWORD",
    "##SITE_URL",
    "##SECRET",
    "##ELECTION_YEAR",
    "##UPDATE_PROFILE",
];

/// An ordered placeholder set. Values are bound to placeholders by position
/// and substituted in this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    name: String,
    placeholders: Vec<String>,
}

impl Variant {
    pub fn new(name: impl Into<String>, placeholders: Vec<String>) -> Self {
        Self {
            name: name.into(),
            placeholders,
        }
    }

    fn from_static(name: &str, placeholders: &[&str]) -> Self {
        Self::new(name, placeholders.iter().map(|p| p.to_string()).collect())
    }

    pub fn project_id() -> Self {
        Self::from_static("project-id", PROJECT_ID)
    }

    pub fn mongo() -> Self {
        Self::from_static("mongo", MONGO)
    }

    pub fn app_engine() -> Self {
        Self::from_static("app-engine", APP_ENGINE)
    }

    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "project-id" => Some(Self::project_id()),
            "mongo" => Some(Self::mongo()),
            "app-engine" => Some(Self::app_engine()),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Length of the full argument vector, program name included.
    pub fn expected_argc(&self) -> usize {
        self.placeholders.len() + 1
    }

    /// Pairs each placeholder with the value at the same position. Fails
    /// unless exactly one value per placeholder is given.
    pub fn bind<S: AsRef<str>>(&self, values: &[S]) -> Result<Vec<Substitution>, Error> {
        if values.len() != self.placeholders.len() {
            return Err(Error::ArgumentCount {
                actual: values.len() + 1,
                expected: self.expected_argc(),
            });
        }

        Ok(self
            .placeholders
            .iter()
            .zip(values)
            .map(|(placeholder, value)| Substitution::new(placeholder.clone(), value.as_ref()))
            .collect())
    }
}
