//! JSON 文件实现的 Voice Registry
//!
//! 索引格式: `{"voices": [VoiceProfile, ...]}`
//!
//! - 启动时读取；文件缺失、为空或损坏时从空索引开始，不阻塞启动
//! - 无法通过校验的条目（非法 voice_id、不支持的语言）跳过并告警
//! - put 先把包含新条目的快照写盘（临时文件 + rename），成功后才更新内存，
//!   读者只能看到已持久化的条目

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::application::ports::{RegistryError, VoiceRegistryPort};
use crate::domain::voice::VoiceProfile;

/// 写入索引时的内容
#[derive(Debug, Serialize)]
struct IndexFile<'a> {
    voices: &'a [VoiceProfile],
}

/// 读取索引时的内容，条目逐个校验
#[derive(Debug, Default, Deserialize)]
struct RawIndexFile {
    #[serde(default)]
    voices: Vec<serde_json::Value>,
}

/// JSON Voice Registry
pub struct JsonVoiceRegistry {
    index_path: PathBuf,
    voices: DashMap<String, VoiceProfile>,
    /// 快照 → 写盘 → 更新内存 整体串行
    write_lock: Mutex<()>,
}

impl JsonVoiceRegistry {
    /// 加载索引
    ///
    /// 损坏的索引会被移到 `<index>.corrupt`（尽力而为），随后从空索引开始
    pub fn load(index_path: impl Into<PathBuf>) -> Self {
        let index_path = index_path.into();
        let voices = DashMap::new();

        match read_index(&index_path) {
            Ok(profiles) => {
                for profile in profiles {
                    voices.insert(profile.voice_id().to_string(), profile);
                }
                tracing::info!(
                    path = %index_path.display(),
                    voices = voices.len(),
                    "Voice registry loaded"
                );
            }
            Err(e) => {
                tracing::warn!(
                    path = %index_path.display(),
                    error = %e,
                    "Voice index unreadable, starting with an empty registry"
                );
                let backup = corrupt_backup_path(&index_path);
                if let Err(e) = fs::rename(&index_path, &backup) {
                    tracing::warn!(error = %e, "Failed to move corrupted voice index aside");
                }
            }
        }

        Self {
            index_path,
            voices,
            write_lock: Mutex::new(()),
        }
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    fn sorted_profiles(&self) -> Vec<VoiceProfile> {
        let mut profiles: Vec<VoiceProfile> =
            self.voices.iter().map(|entry| entry.value().clone()).collect();
        sort_profiles(&mut profiles);
        profiles
    }

    fn write_index(&self, profiles: &[VoiceProfile]) -> Result<(), RegistryError> {
        let json = serde_json::to_string_pretty(&IndexFile { voices: profiles })
            .map_err(|e| RegistryError::SerializationError(e.to_string()))?;

        if let Some(parent) = self.index_path.parent() {
            fs::create_dir_all(parent).map_err(|e| RegistryError::IoError(e.to_string()))?;
        }

        let tmp_path = self.index_path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| RegistryError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, &self.index_path)
            .map_err(|e| RegistryError::IoError(e.to_string()))?;

        tracing::debug!(
            path = %self.index_path.display(),
            voices = profiles.len(),
            "Voice index saved"
        );

        Ok(())
    }
}

fn sort_profiles(profiles: &mut [VoiceProfile]) {
    profiles.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.voice_id().as_str().cmp(b.voice_id().as_str()))
    });
}

impl VoiceRegistryPort for JsonVoiceRegistry {
    fn get(&self, voice_id: &str) -> Option<VoiceProfile> {
        self.voices.get(voice_id).map(|entry| entry.value().clone())
    }

    fn contains(&self, voice_id: &str) -> bool {
        self.voices.contains_key(voice_id)
    }

    fn put(&self, profile: VoiceProfile) -> Result<(), RegistryError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let key = profile.voice_id().to_string();

        let mut snapshot: Vec<VoiceProfile> = self
            .voices
            .iter()
            .filter(|entry| entry.key() != &key)
            .map(|entry| entry.value().clone())
            .collect();
        snapshot.push(profile.clone());
        sort_profiles(&mut snapshot);

        // 写盘失败时内存保持原样
        self.write_index(&snapshot)?;
        self.voices.insert(key, profile);

        Ok(())
    }

    fn list(&self) -> Vec<VoiceProfile> {
        self.sorted_profiles()
    }

    fn save(&self) -> Result<(), RegistryError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_index(&self.sorted_profiles())
    }
}

/// 读取索引；文件不存在视为空索引
fn read_index(path: &Path) -> Result<Vec<VoiceProfile>, RegistryError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(RegistryError::Corrupted(e.to_string())),
    };

    if content.trim().is_empty() {
        return Err(RegistryError::Corrupted("index file is empty".to_string()));
    }

    let index: RawIndexFile =
        serde_json::from_str(&content).map_err(|e| RegistryError::Corrupted(e.to_string()))?;

    let profiles = index
        .voices
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<VoiceProfile>(entry) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping invalid voice index entry");
                None
            }
        })
        .collect();

    Ok(profiles)
}

fn corrupt_backup_path(index_path: &Path) -> PathBuf {
    let mut name = index_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".corrupt");
    index_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voice::{Language, VoiceId};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn profile(id: &str, lang: &str) -> VoiceProfile {
        VoiceProfile::new(
            VoiceId::parse(id).unwrap(),
            PathBuf::from(format!("data/voices/{}/ref_a.wav", id)),
            Language::parse(lang).unwrap(),
            PathBuf::from(format!("data/voices/{}/preview.wav", id)),
        )
    }

    #[test]
    fn test_missing_index_starts_empty() {
        let dir = tempdir().unwrap();
        let registry = JsonVoiceRegistry::load(dir.path().join("index.json"));

        assert!(registry.is_empty());
        assert!(!registry.contains("anything"));
        assert!(registry.get("anything").is_none());
    }

    #[test]
    fn test_put_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.json");

        let registry = JsonVoiceRegistry::load(&path);
        registry.put(profile("a", "es")).unwrap();
        registry.put(profile("b", "en")).unwrap();
        assert!(path.exists());

        let reloaded = JsonVoiceRegistry::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("b").unwrap().language().as_str(), "en");
        assert_eq!(reloaded.get("a"), registry.get("a"));
    }

    #[test]
    fn test_index_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.json");

        let registry = JsonVoiceRegistry::load(&path);
        registry.put(profile("a", "es")).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let voices = json["voices"].as_array().unwrap();
        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0]["voice_id"], "a");
        assert_eq!(voices[0]["language"], "es");
        assert_eq!(voices[0]["preview_wav_path"], "data/voices/a/preview.wav");
    }

    #[test]
    fn test_put_overwrites_same_id() {
        let dir = tempdir().unwrap();
        let registry = JsonVoiceRegistry::load(dir.path().join("index.json"));

        registry.put(profile("a", "es")).unwrap();
        registry.put(profile("a", "it")).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a").unwrap().language().as_str(), "it");
    }

    #[test]
    fn test_corrupted_index_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.json");
        fs::write(&path, "{ this is not json").unwrap();

        let registry = JsonVoiceRegistry::load(&path);
        assert!(registry.is_empty());
        assert!(dir.path().join("index.json.corrupt").exists());

        // 损坏后的首次写入生成新的有效索引
        registry.put(profile("a", "es")).unwrap();
        assert_eq!(JsonVoiceRegistry::load(&path).len(), 1);
    }

    #[test]
    fn test_empty_index_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.json");
        fs::write(&path, "   \n").unwrap();

        assert!(JsonVoiceRegistry::load(&path).is_empty());
    }

    #[test]
    fn test_failed_put_leaves_registry_unchanged() {
        let dir = tempdir().unwrap();
        // 父路径是普通文件，写索引必然失败
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        let registry = JsonVoiceRegistry::load(blocker.join("index.json"));

        assert!(registry.put(profile("a", "es")).is_err());
        assert!(!registry.contains("a"));
    }

    #[test]
    fn test_failed_put_is_never_visible() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        let registry = Arc::new(JsonVoiceRegistry::load(blocker.join("index.json")));
        let done = Arc::new(AtomicBool::new(false));

        let reader = {
            let registry = registry.clone();
            let done = done.clone();
            std::thread::spawn(move || {
                let mut seen = false;
                while !done.load(Ordering::SeqCst) {
                    seen |= registry.contains("a") || registry.get("a").is_some();
                }
                seen
            })
        };

        for _ in 0..50 {
            assert!(registry.put(profile("a", "es")).is_err());
        }
        done.store(true, Ordering::SeqCst);

        assert!(!reader.join().unwrap());
        assert!(!registry.contains("a"));
    }

    #[test]
    fn test_invalid_entries_are_skipped_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.json");
        fs::write(
            &path,
            r#"{"voices": [
                {"voice_id": "../escape", "ref_audio_path": "r.wav", "language": "es", "preview_wav_path": "p.wav"},
                {"voice_id": "bad-lang", "ref_audio_path": "r.wav", "language": "xx", "preview_wav_path": "p.wav"},
                {"voice_id": "good", "ref_audio_path": "r.wav", "language": "EN", "preview_wav_path": "p.wav"}
            ]}"#,
        )
        .unwrap();

        let registry = JsonVoiceRegistry::load(&path);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("good").unwrap().language().as_str(), "en");
        assert!(!registry.contains("../escape"));
        assert!(!dir.path().join("index.json.corrupt").exists());
    }

    #[test]
    fn test_list_is_sorted_by_creation() {
        let dir = tempdir().unwrap();
        let registry = JsonVoiceRegistry::load(dir.path().join("index.json"));

        registry.put(profile("first", "es")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        registry.put(profile("second", "es")).unwrap();

        let ids: Vec<String> = registry
            .list()
            .iter()
            .map(|p| p.voice_id().to_string())
            .collect();
        assert_eq!(ids, vec!["first", "second"]);
    }
}
