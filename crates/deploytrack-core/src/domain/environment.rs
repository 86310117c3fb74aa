//! Environment tiers and the fixed-arity per-environment record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four fixed deployment tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Qa,
    Uat,
    Prod,
}

impl Environment {
    /// Display and iteration order.
    pub const ALL: [Environment; 4] = [
        Environment::Dev,
        Environment::Qa,
        Environment::Uat,
        Environment::Prod,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Qa => "qa",
            Environment::Uat => "uat",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown environment '{0}' (expected dev, qa, uat or prod)")]
pub struct UnknownEnvironment(pub String);

impl FromStr for Environment {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "qa" => Ok(Environment::Qa),
            "uat" => Ok(Environment::Uat),
            "prod" => Ok(Environment::Prod),
            _ => Err(UnknownEnvironment(s.to_string())),
        }
    }
}

/// One value per environment.
///
/// The key set is closed, so there is no "missing key" case to handle:
/// every environment always has a slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvMap<T> {
    pub dev: T,
    pub qa: T,
    pub uat: T,
    pub prod: T,
}

impl<T> EnvMap<T> {
    pub fn from_fn(mut f: impl FnMut(Environment) -> T) -> Self {
        Self {
            dev: f(Environment::Dev),
            qa: f(Environment::Qa),
            uat: f(Environment::Uat),
            prod: f(Environment::Prod),
        }
    }

    pub fn get(&self, env: Environment) -> &T {
        match env {
            Environment::Dev => &self.dev,
            Environment::Qa => &self.qa,
            Environment::Uat => &self.uat,
            Environment::Prod => &self.prod,
        }
    }

    pub fn get_mut(&mut self, env: Environment) -> &mut T {
        match env {
            Environment::Dev => &mut self.dev,
            Environment::Qa => &mut self.qa,
            Environment::Uat => &mut self.uat,
            Environment::Prod => &mut self.prod,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Environment, &T)> {
        Environment::ALL.into_iter().map(move |env| (env, self.get(env)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(Environment, &T) -> U) -> EnvMap<U> {
        EnvMap::from_fn(|env| f(env, self.get(env)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::dev("dev", Environment::Dev)]
    #[case::qa("QA", Environment::Qa)]
    #[case::uat(" uat ", Environment::Uat)]
    #[case::prod("Prod", Environment::Prod)]
    fn parse_environment(#[case] raw: &str, #[case] expected: Environment) {
        assert_eq!(raw.parse::<Environment>().unwrap(), expected);
    }

    #[test]
    fn fifth_environment_is_rejected() {
        let err = "staging".parse::<Environment>().unwrap_err();
        assert_eq!(err, UnknownEnvironment("staging".to_string()));
    }

    #[test]
    fn env_map_iterates_in_fixed_order() {
        let map = EnvMap::from_fn(|env| env.as_str().len());
        let envs: Vec<_> = map.iter().map(|(env, _)| env).collect();
        assert_eq!(envs, Environment::ALL.to_vec());
        assert_eq!(*map.get(Environment::Prod), 4);
    }

    #[test]
    fn get_mut_touches_only_one_slot() {
        let mut map: EnvMap<u32> = EnvMap::default();
        *map.get_mut(Environment::Uat) += 5;
        assert_eq!(map.uat, 5);
        assert_eq!(map.dev + map.qa + map.prod, 0);
    }
}
