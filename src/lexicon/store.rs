// Lexicon store: the registry of language packs and the whitelist.
//
// The built-in packs are compiled into the binary. An optional override
// directory can replace a built-in pack (same file stem as the code) or add a
// new language, and a `whitelist.json` there extends the built-in whitelist.
// A pack that fails to load degrades to empty; nothing here aborts startup.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use super::pack::LanguagePack;
use super::whitelist::Whitelist;
use crate::error::LexiconError;
use crate::normalize::obfuscation::Script;

/// Built-in packs: (language code, script, JSON resource).
const BUILTIN_PACKS: &[(&str, Script, &str)] = &[
    ("en", Script::Latin, include_str!("../../data/lexicons/en.json")),
    ("bg", Script::Cyrillic, include_str!("../../data/lexicons/bg.json")),
    ("ru", Script::Cyrillic, include_str!("../../data/lexicons/ru.json")),
    ("de", Script::Latin, include_str!("../../data/lexicons/de.json")),
    ("es", Script::Latin, include_str!("../../data/lexicons/es.json")),
];

const BUILTIN_WHITELIST: &str = include_str!("../../data/whitelist.json");

const WHITELIST_FILE: &str = "whitelist.json";

/// Immutable, shared lexicon data keyed by language code.
#[derive(Debug, Clone)]
pub struct LexiconStore {
    packs: BTreeMap<String, Arc<LanguagePack>>,
    whitelist: Arc<Whitelist>,
}

impl LexiconStore {
    /// Only the packs compiled into the binary.
    pub fn builtin() -> Self {
        let mut packs = BTreeMap::new();
        for (code, script, json) in BUILTIN_PACKS {
            let origin = format!("builtin:{code}");
            let pack = LanguagePack::from_json(&origin, json).unwrap_or_else(|e| {
                warn!(pack = code, error = %e, "Built-in language pack failed to load, using empty pack");
                LanguagePack::empty(code, *script)
            });
            packs.insert(code.to_string(), Arc::new(pack));
        }

        let whitelist = Whitelist::from_json("builtin:whitelist", BUILTIN_WHITELIST)
            .unwrap_or_else(|e| {
                warn!(error = %e, "Built-in whitelist failed to load, using empty whitelist");
                Whitelist::empty()
            });

        Self {
            packs,
            whitelist: Arc::new(whitelist),
        }
    }

    /// Built-in packs plus whatever the override directory provides.
    pub fn load(override_dir: Option<&Path>) -> Self {
        let mut store = Self::builtin();
        if let Some(dir) = override_dir {
            if let Err(e) = store.apply_overrides(dir) {
                warn!(dir = %dir.display(), error = %e, "Lexicon override directory unreadable, using built-in packs");
            }
        }
        info!(
            packs = store.packs.len(),
            terms = store.packs.values().map(|p| p.len()).sum::<usize>(),
            whitelist = store.whitelist.len(),
            "Lexicon store ready"
        );
        store
    }

    /// Assemble a store from already-built parts.
    pub fn from_parts(packs: Vec<LanguagePack>, whitelist: Whitelist) -> Self {
        Self {
            packs: packs
                .into_iter()
                .map(|p| (p.code().to_string(), Arc::new(p)))
                .collect(),
            whitelist: Arc::new(whitelist),
        }
    }

    fn apply_overrides(&mut self, dir: &Path) -> Result<(), LexiconError> {
        let entries = fs::read_dir(dir).map_err(|source| LexiconError::Read {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let contents = match fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(source) => {
                    let e = LexiconError::Read {
                        path: path.clone(),
                        source,
                    };
                    warn!(error = %e, "Skipping unreadable lexicon override");
                    continue;
                }
            };
            let origin = path.display().to_string();

            if path.file_name().and_then(|n| n.to_str()) == Some(WHITELIST_FILE) {
                match Whitelist::from_json(&origin, &contents)
                    .and_then(|extra| self.whitelist.merged(&extra))
                {
                    Ok(merged) => self.whitelist = Arc::new(merged),
                    Err(e) => warn!(error = %e, "Ignoring whitelist override"),
                }
                continue;
            }

            let code = stem.to_lowercase();
            let pack = match LanguagePack::from_json(&origin, &contents) {
                Ok(pack) => pack,
                Err(e) => {
                    warn!(pack = %code, error = %e, "Language pack override malformed, pack degraded to empty");
                    let script = self
                        .packs
                        .get(&code)
                        .map(|p| p.script())
                        .unwrap_or_default();
                    LanguagePack::empty(&code, script)
                }
            };
            info!(pack = pack.code(), terms = pack.len(), source = %origin, "Loaded language pack override");
            self.packs.insert(pack.code().to_string(), Arc::new(pack));
        }
        Ok(())
    }

    pub fn pack(&self, code: &str) -> Option<&Arc<LanguagePack>> {
        self.packs.get(code)
    }

    pub fn packs(&self) -> impl Iterator<Item = &Arc<LanguagePack>> {
        self.packs.values()
    }

    /// Codes of every loaded pack, sorted.
    pub fn codes(&self) -> Vec<&str> {
        self.packs.keys().map(String::as_str).collect()
    }

    pub fn whitelist(&self) -> &Arc<Whitelist> {
        &self.whitelist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_builtin_packs_all_load() {
        let store = LexiconStore::builtin();
        assert_eq!(store.codes(), vec!["bg", "de", "en", "es", "ru"]);
        for pack in store.packs() {
            assert!(!pack.is_empty(), "pack {} should have terms", pack.code());
        }
        assert!(!store.whitelist().is_empty());
    }

    #[test]
    fn test_builtin_scripts() {
        let store = LexiconStore::builtin();
        assert_eq!(store.pack("bg").unwrap().script(), Script::Cyrillic);
        assert_eq!(store.pack("en").unwrap().script(), Script::Latin);
    }

    #[test]
    fn test_override_replaces_and_degrades() {
        let dir = env::temp_dir().join(format!("cinder-lexicon-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("en.json"),
            r#"{ "code": "en", "tiers": { "mild": ["gosh"] } }"#,
        )
        .unwrap();
        fs::write(dir.join("de.json"), "not json").unwrap();
        fs::write(dir.join("whitelist.json"), r#"{ "terms": ["goshawk"] }"#).unwrap();

        let store = LexiconStore::load(Some(&dir));
        fs::remove_dir_all(&dir).unwrap();

        let en = store.pack("en").unwrap();
        assert_eq!(en.len(), 1);
        assert_eq!(en.terms()[0].text, "gosh");
        assert!(store.pack("de").unwrap().is_empty());
        assert!(store.whitelist().contains("goshawk"));
        // Built-in whitelist terms survive the merge
        assert!(store.whitelist().contains("scunthorpe"));
    }

    #[test]
    fn test_missing_override_dir_keeps_builtin() {
        let store = LexiconStore::load(Some(Path::new("/nonexistent/cinder/lexicons")));
        assert_eq!(store.codes().len(), BUILTIN_PACKS.len());
    }
}
