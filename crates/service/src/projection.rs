//! Explicit field selection for the user profile.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProfileField {
    Id,
    CreatedAt,
    UpdatedAt,
    PhoneNumber,
    Name,
    Picture,
    Balance,
    Cashback,
    Favorites,
}

impl ProfileField {
    pub const ALL: [ProfileField; 9] = [
        ProfileField::Id,
        ProfileField::CreatedAt,
        ProfileField::UpdatedAt,
        ProfileField::PhoneNumber,
        ProfileField::Name,
        ProfileField::Picture,
        ProfileField::Balance,
        ProfileField::Cashback,
        ProfileField::Favorites,
    ];

    /// JSON key of the field.
    pub fn key(&self) -> &'static str {
        match self {
            ProfileField::Id => "id",
            ProfileField::CreatedAt => "createdAt",
            ProfileField::UpdatedAt => "updatedAt",
            ProfileField::PhoneNumber => "phoneNumber",
            ProfileField::Name => "name",
            ProfileField::Picture => "picture",
            ProfileField::Balance => "balance",
            ProfileField::Cashback => "cashback",
            ProfileField::Favorites => "favorites",
        }
    }
}

impl FromStr for ProfileField {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProfileField::ALL
            .into_iter()
            .find(|f| f.key() == s)
            .ok_or_else(|| ServiceError::Validation(format!("unknown profile field: {}", s)))
    }
}

/// Set of profile fields to return. Defaults to every field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSelection(BTreeSet<ProfileField>);

impl Default for UserSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl UserSelection {
    pub fn all() -> Self {
        Self(ProfileField::ALL.into_iter().collect())
    }

    /// Parse a comma-separated list of camelCase names. Missing or blank means all fields.
    pub fn parse(fields: Option<&str>) -> Result<Self, ServiceError> {
        let names: Vec<&str> = fields
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            return Ok(Self::all());
        }
        let set = names.into_iter().map(ProfileField::from_str).collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self(set))
    }

    pub fn contains(&self, field: ProfileField) -> bool {
        self.0.contains(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = ProfileField> + '_ {
        self.0.iter().copied()
    }

    /// Keep only the selected keys of a serialized object.
    pub fn project(&self, mut full: Map<String, Value>) -> Map<String, Value> {
        let mut out = Map::new();
        for field in self.fields() {
            if let Some(v) = full.remove(field.key()) {
                out.insert(field.key().to_string(), v);
            }
        }
        out
    }
}
