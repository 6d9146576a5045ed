// ABOUTME: Proxy settings forwarded from the host environment into nodes.
// ABOUTME: Read once per creation and rendered as `-e KEY=VALUE` run arguments.

use std::collections::BTreeMap;
use std::env::VarError;

/// Proxy variables forwarded into nodes, in both conventional spellings.
pub const PROXY_VARS: [&str; 6] = [
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "NO_PROXY",
    "http_proxy",
    "https_proxy",
    "no_proxy",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProxyError {
    #[error("{0} is not valid unicode")]
    NotUnicode(String),
}

/// Proxy environment captured at node creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyDetails {
    envs: BTreeMap<String, String>,
}

impl ProxyDetails {
    /// Capture the proxy variables set in this process's environment.
    ///
    /// Unset and empty variables are skipped.
    pub fn from_env() -> Result<Self, ProxyError> {
        Self::from_lookup(|key| std::env::var(key))
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ProxyError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let mut envs = BTreeMap::new();
        for key in PROXY_VARS {
            match lookup(key) {
                Ok(value) if !value.is_empty() => {
                    envs.insert(key.to_string(), value);
                }
                Ok(_) | Err(VarError::NotPresent) => {}
                Err(VarError::NotUnicode(_)) => return Err(ProxyError::NotUnicode(key.to_string())),
            }
        }
        Ok(Self { envs })
    }

    /// Explicit proxy settings, bypassing the environment.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            envs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn envs(&self) -> &BTreeMap<String, String> {
        &self.envs
    }

    /// `-e KEY=VALUE` pairs, sorted by key.
    pub fn run_args(&self) -> Vec<String> {
        self.envs
            .iter()
            .flat_map(|(key, value)| ["-e".to_string(), format!("{key}={value}")])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::ffi::OsString;

    fn lookup_from(vars: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Result<String, VarError> {
        move |key| {
            vars.get(key)
                .map(|v| v.to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn collects_set_variables_only() {
        let vars = HashMap::from([
            ("HTTP_PROXY", "http://proxy:3128"),
            ("no_proxy", "localhost"),
            ("HTTPS_PROXY", ""),
        ]);
        let details = ProxyDetails::from_lookup(lookup_from(vars)).unwrap();

        assert_eq!(details.envs().len(), 2);
        assert_eq!(
            details.run_args(),
            vec![
                "-e",
                "HTTP_PROXY=http://proxy:3128",
                "-e",
                "no_proxy=localhost"
            ]
        );
    }

    #[test]
    fn non_unicode_value_is_an_error() {
        let details = ProxyDetails::from_lookup(|key| {
            if key == "NO_PROXY" {
                Err(VarError::NotUnicode(OsString::from("x")))
            } else {
                Err(VarError::NotPresent)
            }
        });
        assert_eq!(details, Err(ProxyError::NotUnicode("NO_PROXY".to_string())));
    }

    #[test]
    fn reads_process_environment() {
        temp_env::with_vars(
            [
                ("HTTP_PROXY", Some("http://corp:8080")),
                ("HTTPS_PROXY", None),
                ("NO_PROXY", None),
                ("http_proxy", None),
                ("https_proxy", None),
                ("no_proxy", None),
            ],
            || {
                let details = ProxyDetails::from_env().unwrap();
                assert_eq!(
                    details.envs().get("HTTP_PROXY").map(String::as_str),
                    Some("http://corp:8080")
                );
                assert_eq!(details.envs().len(), 1);
            },
        );
    }
}
