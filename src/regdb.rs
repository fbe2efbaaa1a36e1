// src/regdb.rs

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce,
};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use rand::{rngs::OsRng, RngCore};

#[derive(Debug)]
pub enum RegDbError {
    Io(std::io::Error),
    Serialization(String),
    Decryption(String),
    Encryption(String),
    KeyInvalid,
}

impl From<std::io::Error> for RegDbError {
    fn from(e: std::io::Error) -> Self {
        RegDbError::Io(e)
    }
}

impl std::fmt::Display for RegDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegDbError::Io(e) => write!(f, "IO error: {}", e),
            RegDbError::Serialization(e) => write!(f, "Serialization error: {}", e),
            RegDbError::Decryption(e) => write!(f, "Decryption error: {}", e),
            RegDbError::Encryption(e) => write!(f, "Encryption error: {}", e),
            RegDbError::KeyInvalid => write!(f, "Invalid key length"),
        }
    }
}

impl std::error::Error for RegDbError {}

/// Мастер-ключ шифрования (32 байта = 256 бит)
pub type MasterKey = [u8; 32];

/// RegDB — зашифрованное embedded-хранилище кадрового реестра.
/// Формат файла: 12 байт nonce + AES-256-GCM(bincode(HashMap)).
pub struct RegDB {
    path: PathBuf,
    cipher: Aes256Gcm,
    cache: RwLock<HashMap<String, Vec<u8>>>,
}

impl RegDB {
    /// Открыть базу по пути с мастер-ключом
    pub fn open<P: AsRef<Path>>(path: P, key: &MasterKey) -> Result<Self, RegDbError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
        let db = Self {
            path: path.as_ref().to_path_buf(),
            cipher,
            cache: RwLock::new(HashMap::new()),
        };
        db.load()?;
        Ok(db)
    }

    #[allow(dead_code)]
    /// Сгенерировать новый мастер-ключ (сохранить обязательно!)
    pub fn generate_key() -> MasterKey {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        key
    }

    fn load(&self) -> Result<(), RegDbError> {
        // Файл ещё не создан → пустая база
        if !self.path.exists() {
            return Ok(());
        }

        let mut file = OpenOptions::new().read(true).open(&self.path)?;
        let mut encrypted = Vec::new();
        file.read_to_end(&mut encrypted)?;

        if encrypted.is_empty() {
            return Ok(());
        }

        if encrypted.len() < 12 {
            return Err(RegDbError::Decryption("File too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = encrypted.split_at(12);
        let nonce = Nonce::from_slice(nonce_bytes);

        let payload = Payload {
            msg: ciphertext,
            aad: &[],
        };

        let plaintext = self
            .cipher
            .decrypt(nonce, payload)
            .map_err(|_| RegDbError::Decryption("AES-GCM decryption failed".to_string()))?;

        let data: HashMap<String, Vec<u8>> = bincode::deserialize(&plaintext)
            .map_err(|e| RegDbError::Serialization(e.to_string()))?;

        let mut cache = self.cache.write().map_err(|_| {
            RegDbError::Io(std::io::Error::new(std::io::ErrorKind::Other, "RwLock poisoned"))
        })?;
        *cache = data;

        Ok(())
    }

    /// Сбросить данные на диск
    pub fn flush(&self) -> Result<(), RegDbError> {
        let cache = self.cache.read().map_err(|_| {
            RegDbError::Io(std::io::Error::new(std::io::ErrorKind::Other, "RwLock poisoned"))
        })?;
        let plaintext = bincode::serialize(&*cache)
            .map_err(|e| RegDbError::Serialization(e.to_string()))?;

        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let payload = Payload {
            msg: &plaintext,
            aad: &[],
        };

        let ciphertext = self
            .cipher
            .encrypt(nonce, payload)
            .map_err(|_| RegDbError::Encryption("AES-GCM encryption failed".to_string()))?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;

        file.write_all(&nonce_bytes)?;
        file.write_all(&ciphertext)?;
        file.sync_all()?;

        Ok(())
    }

    /// Получить значение по ключу
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let cache = self.cache.read().ok()?;
        cache.get(key).cloned()
    }

    #[allow(dead_code)]
    pub fn contains_key(&self, key: &str) -> bool {
        match self.cache.read() {
            Ok(cache) => cache.contains_key(key),
            Err(_) => false,
        }
    }

    /// Установить значение
    pub fn set(&self, key: String, value: Vec<u8>) -> Result<(), RegDbError> {
        let mut cache = self.cache.write().map_err(|_| {
            RegDbError::Io(std::io::Error::new(std::io::ErrorKind::Other, "RwLock poisoned"))
        })?;
        cache.insert(key, value);
        drop(cache);
        self.flush()?;
        Ok(())
    }

    /// Удалить ключ
    pub fn remove(&self, key: &str) -> bool {
        let mut cache = match self.cache.write() {
            Ok(c) => c,
            Err(_) => return false,
        };
        cache.remove(key).is_some()
    }
}

// Автоматическое сохранение при выходе
impl Drop for RegDB {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
