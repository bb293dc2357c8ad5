//! Backend profiles: a JSON map of profile name -> { url, tls_ca, fallback }.
//! Stored under $XDG_CONFIG_HOME/lanwatch/profiles.json (fallback: the platform config dir).

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, io, path::PathBuf};

pub const PROFILES_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProfileEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_ca: Option<String>,
    /// Seed demo data while the backend has never answered. Defaults to on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,
    #[serde(default)]
    pub version: u32,
}

pub fn config_dir() -> PathBuf {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("lanwatch"),
        _ => dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lanwatch"),
    }
}

pub fn profiles_path() -> PathBuf {
    config_dir().join("profiles.json")
}

/// Missing or corrupt files load as empty.
pub fn load_profiles() -> ProfilesFile {
    match fs::read_to_string(profiles_path()) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "profiles.json unreadable, starting empty");
            ProfilesFile::default()
        }),
        Err(_) => ProfilesFile::default(),
    }
}

pub fn save_profiles(p: &ProfilesFile) -> io::Result<()> {
    let path = profiles_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut p = p.clone();
    p.version = PROFILES_VERSION;
    let data = serde_json::to_vec_pretty(&p).map_err(io::Error::other)?;
    fs::write(path, data)
}

#[derive(Debug, PartialEq, Eq)]
pub enum ResolveProfile {
    /// Runtime inputs, possibly persisted later by the caller.
    Direct(ProfileEntry),
    /// Taken from an existing profile.
    Loaded(ProfileEntry),
    /// No URL and no profile name: ask which saved profile to use.
    PromptSelect(Vec<String>),
    /// Named profile does not exist yet: ask for its URL.
    PromptCreate(String),
    /// Nothing to go on.
    None,
}

pub struct ProfileRequest {
    pub profile_name: Option<String>,
    pub url: Option<String>,
    pub tls_ca: Option<String>,
}

impl ProfileRequest {
    pub fn resolve(self, pf: &ProfilesFile) -> ResolveProfile {
        match (self.profile_name, self.url) {
            (Some(name), None) => match pf.profiles.get(&name) {
                Some(entry) => ResolveProfile::Loaded(entry.clone()),
                None => ResolveProfile::PromptCreate(name),
            },
            (_, Some(url)) => ResolveProfile::Direct(ProfileEntry {
                url,
                tls_ca: self.tls_ca,
                fallback: None,
            }),
            (None, None) if pf.profiles.is_empty() => ResolveProfile::None,
            (None, None) => ResolveProfile::PromptSelect(pf.profiles.keys().cloned().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with(name: &str, url: &str) -> ProfilesFile {
        let mut pf = ProfilesFile::default();
        pf.profiles.insert(
            name.into(),
            ProfileEntry {
                url: url.into(),
                ..Default::default()
            },
        );
        pf
    }

    #[test]
    fn resolve_cases() {
        let pf = file_with("lab", "http://10.0.0.2:8000");
        let req = |p: Option<&str>, u: Option<&str>| ProfileRequest {
            profile_name: p.map(Into::into),
            url: u.map(Into::into),
            tls_ca: None,
        };
        assert!(matches!(req(Some("lab"), None).resolve(&pf), ResolveProfile::Loaded(e) if e.url == "http://10.0.0.2:8000"));
        assert_eq!(req(Some("new"), None).resolve(&pf), ResolveProfile::PromptCreate("new".into()));
        assert!(matches!(req(Some("lab"), Some("http://x")).resolve(&pf), ResolveProfile::Direct(e) if e.url == "http://x"));
        assert_eq!(req(None, None).resolve(&pf), ResolveProfile::PromptSelect(vec!["lab".into()]));
        assert_eq!(req(None, None).resolve(&ProfilesFile::default()), ResolveProfile::None);
    }
}
