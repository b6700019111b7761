use std::time::Duration;

use serde::Deserialize;

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins (wildcard "*" or explicit list)
    #[serde(default)]
    pub origins: AnyOrList,
    /// Allowed HTTP methods (wildcard "*" or explicit list)
    #[serde(default)]
    pub methods: AnyOrList,
    /// Allowed request headers (wildcard "*" or explicit list)
    #[serde(default)]
    pub headers: AnyOrList,
    /// Allow cookies and authorization headers on cross-origin requests
    #[serde(default)]
    pub credentials: bool,
    /// Max age for the preflight cache in seconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

impl CorsConfig {
    pub fn max_age_duration(&self) -> Option<Duration> {
        self.max_age.map(Duration::from_secs)
    }
}

/// Either the wildcard "*" or an explicit list of values
///
/// A list containing "*" collapses to the wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawList")]
pub enum AnyOrList {
    #[default]
    Any,
    List(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawList {
    One(String),
    Many(Vec<String>),
}

impl From<RawList> for AnyOrList {
    fn from(raw: RawList) -> Self {
        let values = match raw {
            RawList::One(value) => vec![value],
            RawList::Many(values) => values,
        };

        if values.iter().any(|value| value == "*") {
            Self::Any
        } else {
            Self::List(values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        cors: CorsConfig,
    }

    fn parse(input: &str) -> CorsConfig {
        toml::from_str::<Wrapper>(input).unwrap().cors
    }

    #[test]
    fn defaults_to_any() {
        let cors = parse("[cors]");

        assert_eq!(cors.origins, AnyOrList::Any);
        assert!(!cors.credentials);
        assert_eq!(cors.max_age_duration(), None);
    }

    #[test]
    fn explicit_origins() {
        let cors = parse(
            r#"
            [cors]
            origins = ["http://localhost:4200", "http://localhost:5173"]
            methods = ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
            headers = ["Content-Type", "Authorization"]
            credentials = true
            max_age = 600
            "#,
        );

        assert_eq!(
            cors.origins,
            AnyOrList::List(vec![
                "http://localhost:4200".to_string(),
                "http://localhost:5173".to_string()
            ])
        );
        assert!(cors.credentials);
        assert_eq!(cors.max_age_duration(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn wildcard_in_list_collapses() {
        let cors = parse("[cors]\nmethods = [\"GET\", \"*\"]");
        assert_eq!(cors.methods, AnyOrList::Any);
    }

    #[test]
    fn single_string_is_a_list() {
        let cors = parse("[cors]\norigins = \"https://app.workoutpal.dev\"");
        assert_eq!(cors.origins, AnyOrList::List(vec!["https://app.workoutpal.dev".to_string()]));
    }
}
