use ::config::{ConfigError, Environment, File, Source};
#[cfg(test)]
use ::config::FileFormat;
use mondrian_anonymization::AnonymizationConfig;
use std::path::Path;

/// Prefix of environment variables overriding scalar settings, e.g.
/// `KCLOAK_K=10`.
const ENV_PREFIX: &str = "KCLOAK";

fn build<S>(source: S, env_prefix: &str) -> Result<AnonymizationConfig, ConfigError>
where
    S: Source + Send + Sync + 'static,
{
    let mut s = ::config::Config::default();
    s.merge(source)?;
    s.merge(Environment::with_prefix(env_prefix))?;
    s.try_into()
}

pub fn load_config(path: &Path) -> Result<AnonymizationConfig, ConfigError> {
    build(File::from(path), ENV_PREFIX)
}

#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<AnonymizationConfig, ConfigError> {
    build(File::from_str(contents, FileFormat::Toml), ENV_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mondrian_anonymization::ColumnConfiguration;

    const CONFIG: &str = r#"
        k = 4
        id_column = "patient"

        [[columns]]
        type = "identifier"
        name = "name"

        [[columns]]
        type = "numerical"
        name = "age"

        [[columns]]
        type = "categorical"
        name = "country"
        hierarchy = "country"

        [[columns]]
        type = "sensitive"
        name = "diagnosis"

        [[hierarchies]]
        name = "country"

        [hierarchies.root]
        label = "World"

        [[hierarchies.root.children]]
        label = "Europe"
        children = [{ label = "France" }, { label = "Italy" }]

        [[hierarchies.root.children]]
        label = "Asia"
        children = [{ label = "Japan" }]
    "#;

    #[test]
    fn test_parse_config() {
        let config = parse_config(CONFIG).unwrap();

        assert_eq!(config.k, 4);
        assert_eq!(config.id_column.as_deref(), Some("patient"));
        assert_eq!(config.columns.len(), 4);
        assert!(matches!(
            &config.columns[2],
            ColumnConfiguration::Categorical { name, hierarchy } if name == "country" && hierarchy == "country"
        ));
        assert_eq!(config.identifier_columns(), vec!["name"]);
        assert_eq!(config.sensitive_columns(), vec!["diagnosis".to_string()]);

        let quasi_identifiers = config.quasi_identifiers().unwrap();
        assert_eq!(quasi_identifiers.len(), 2);
    }

    #[test]
    fn test_parse_config_missing_k() {
        assert!(parse_config("columns = []").is_err());
    }

    #[test]
    fn test_environment_overrides_k() {
        std::env::set_var("KCLOAK_OVERRIDE_TEST_K", "9");

        let config = build(
            File::from_str(CONFIG, FileFormat::Toml),
            "KCLOAK_OVERRIDE_TEST",
        )
        .unwrap();

        assert_eq!(config.k, 9);
        assert_eq!(config.columns.len(), 4);
    }
}
