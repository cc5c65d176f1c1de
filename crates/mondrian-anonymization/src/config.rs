use crate::{
    error::{AnonymizationError, Result},
    hierarchy::{Hierarchy, HierarchyDefinition},
};
use serde::Deserialize;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

#[derive(Debug, Clone)]
pub enum QuasiIdentifierKind {
    Numerical,
    Categorical(Arc<Hierarchy>),
}

#[derive(Debug, Clone)]
pub struct QuasiIdentifier {
    pub name: String,
    pub kind: QuasiIdentifierKind,
}

impl QuasiIdentifier {
    pub fn numerical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: QuasiIdentifierKind::Numerical,
        }
    }

    pub fn categorical(name: impl Into<String>, hierarchy: Arc<Hierarchy>) -> Self {
        Self {
            name: name.into(),
            kind: QuasiIdentifierKind::Categorical(hierarchy),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ColumnConfiguration {
    /// Direct identifier, removed before anonymization.
    Identifier { name: String },
    Numerical { name: String },
    Categorical { name: String, hierarchy: String },
    Sensitive { name: String },
}

impl ColumnConfiguration {
    pub fn name(&self) -> &str {
        match self {
            ColumnConfiguration::Identifier { name }
            | ColumnConfiguration::Numerical { name }
            | ColumnConfiguration::Categorical { name, .. }
            | ColumnConfiguration::Sensitive { name } => name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HierarchyConfiguration {
    pub name: String,
    pub root: HierarchyDefinition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnonymizationConfig {
    pub k: usize,
    pub columns: Vec<ColumnConfiguration>,
    #[serde(default)]
    pub hierarchies: Vec<HierarchyConfiguration>,
    /// Column holding record ids; row numbers are used when absent.
    #[serde(default)]
    pub id_column: Option<String>,
}

impl AnonymizationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.k < 1 {
            return Err(AnonymizationError::InvalidConfiguration(format!(
                "k must be at least 1, got {}",
                self.k
            )));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name()) {
                return Err(AnonymizationError::InvalidConfiguration(format!(
                    "column {} is declared more than once",
                    column.name()
                )));
            }
        }

        let mut hierarchy_names = HashSet::new();
        for hierarchy in &self.hierarchies {
            if !hierarchy_names.insert(hierarchy.name.as_str()) {
                return Err(AnonymizationError::InvalidConfiguration(format!(
                    "hierarchy {} is declared more than once",
                    hierarchy.name
                )));
            }
        }

        for column in &self.columns {
            if let ColumnConfiguration::Categorical { name, hierarchy } = column {
                if !hierarchy_names.contains(hierarchy.as_str()) {
                    return Err(AnonymizationError::InvalidConfiguration(format!(
                        "column {} references the unknown hierarchy {}",
                        name, hierarchy
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn identifier_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|column| matches!(column, ColumnConfiguration::Identifier { .. }))
            .map(|column| column.name())
            .collect()
    }

    pub fn sensitive_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| matches!(column, ColumnConfiguration::Sensitive { .. }))
            .map(|column| column.name().to_string())
            .collect()
    }

    /// Builds every declared hierarchy once; columns sharing a hierarchy
    /// share the same instance.
    pub fn build_hierarchies(&self) -> Result<HashMap<String, Arc<Hierarchy>>> {
        self.hierarchies
            .iter()
            .map(|hierarchy| {
                Hierarchy::new(hierarchy.name.clone(), &hierarchy.root)
                    .map(|built| (hierarchy.name.clone(), Arc::new(built)))
            })
            .collect()
    }

    /// Quasi-identifiers in declaration order.
    pub fn quasi_identifiers(&self) -> Result<Vec<QuasiIdentifier>> {
        self.validate()?;
        let hierarchies = self.build_hierarchies()?;

        let mut quasi_identifiers = vec![];
        for column in &self.columns {
            match column {
                ColumnConfiguration::Numerical { name } => {
                    quasi_identifiers.push(QuasiIdentifier::numerical(name.clone()))
                }
                ColumnConfiguration::Categorical { name, hierarchy } => {
                    let hierarchy = hierarchies.get(hierarchy).cloned().ok_or_else(|| {
                        AnonymizationError::InvalidConfiguration(format!(
                            "unknown hierarchy {}",
                            hierarchy
                        ))
                    })?;
                    quasi_identifiers.push(QuasiIdentifier::categorical(name.clone(), hierarchy))
                }
                ColumnConfiguration::Identifier { .. } | ColumnConfiguration::Sensitive { .. } => {}
            }
        }

        Ok(quasi_identifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        k = 3

        [[columns]]
        type = "identifier"
        name = "name"

        [[columns]]
        type = "numerical"
        name = "age"

        [[columns]]
        type = "categorical"
        name = "gender"
        hierarchy = "gender"

        [[columns]]
        type = "sensitive"
        name = "income"

        [[hierarchies]]
        name = "gender"

        [hierarchies.root]
        label = "Gender"
        children = [{ label = "Male" }, { label = "Female" }]
    "#;

    #[test]
    fn test_deserialize() {
        let config: AnonymizationConfig = toml::from_str(CONFIG).unwrap();

        assert_eq!(config.k, 3);
        assert_eq!(config.identifier_columns(), vec!["name"]);
        assert_eq!(config.sensitive_columns(), vec!["income".to_string()]);
        assert_eq!(config.id_column, None);

        let quasi_identifiers = config.quasi_identifiers().unwrap();
        let names: Vec<&str> = quasi_identifiers.iter().map(|qi| qi.name.as_str()).collect();
        assert_eq!(names, vec!["age", "gender"]);

        match &quasi_identifiers[1].kind {
            QuasiIdentifierKind::Categorical(hierarchy) => {
                assert_eq!(hierarchy.ancestor_path("Female").unwrap(), vec!["Female", "Gender"])
            }
            QuasiIdentifierKind::Numerical => panic!("gender should be categorical"),
        }
    }

    #[test]
    fn test_zero_k_is_rejected() {
        let mut config: AnonymizationConfig = toml::from_str(CONFIG).unwrap();
        config.k = 0;

        assert!(matches!(
            config.validate(),
            Err(AnonymizationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_unknown_hierarchy_is_rejected() {
        let mut config: AnonymizationConfig = toml::from_str(CONFIG).unwrap();
        config.hierarchies.clear();

        assert!(matches!(
            config.quasi_identifiers(),
            Err(AnonymizationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_duplicate_column_is_rejected() {
        let mut config: AnonymizationConfig = toml::from_str(CONFIG).unwrap();
        config.columns.push(ColumnConfiguration::Sensitive {
            name: "age".to_string(),
        });

        assert!(config.validate().is_err());
    }
}
