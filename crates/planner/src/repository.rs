//! Repositories are the roots a query can be planned against. Each one maps
//! to a table and knows the relations it can be joined through.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// Name of the repository on the other side.
    pub target: String,
    /// Column on the owning side.
    pub local_column: String,
    /// Column on the target side.
    pub foreign_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub name: String,
    pub table: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub relations: BTreeMap<String, Relation>,
}

impl Repository {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Repository {
            name: name.into(),
            table: table.into(),
            schema: None,
            relations: BTreeMap::new(),
        }
    }

    pub fn with_relation(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        local_column: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        self.relations.insert(
            name.into(),
            Relation {
                target: target.into(),
                local_column: local_column.into(),
                foreign_column: foreign_column.into(),
            },
        );
        self
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }
}

/// Every repository known to the application, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    repositories: BTreeMap<String, Repository>,
}

impl Catalog {
    pub fn new(repositories: impl IntoIterator<Item = Repository>) -> Self {
        Catalog {
            repositories: repositories
                .into_iter()
                .map(|repo| (repo.name.clone(), repo))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Repository> {
        self.repositories.get(name)
    }

    pub fn insert(&mut self, repository: Repository) {
        self.repositories.insert(repository.name.clone(), repository);
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
