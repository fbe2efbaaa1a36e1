// src/ad/entry.rs

use std::collections::HashMap;

/// Сырая запись каталога: DN + многозначные атрибуты.
/// Повторяет форму ldap3::SearchEntry, но не тянет за собой протокольный
/// тип — движки и тестовые дублёры работают с одной структурой.
#[derive(Debug, Clone, Default)]
pub struct RawEntry {
    pub dn: String,
    pub attrs: HashMap<String, Vec<String>>,
}

/// Состояние атрибута: различаем «атрибута нет в записи» и
/// «атрибут есть, но значение пустое»
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrState<'a> {
    Absent,
    Empty,
    Value(&'a str),
}

impl RawEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attrs: HashMap::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    /// Типизированный доступ к первому значению атрибута
    pub fn attr(&self, name: &str) -> AttrState<'_> {
        match self.attrs.get(name).and_then(|v| v.first()) {
            None => AttrState::Absent,
            Some(v) if v.is_empty() => AttrState::Empty,
            Some(v) => AttrState::Value(v),
        }
    }

    /// Первое непустое значение; отсутствие — не ошибка
    pub fn first(&self, name: &str) -> Option<&str> {
        match self.attr(name) {
            AttrState::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl From<ldap3::SearchEntry> for RawEntry {
    fn from(entry: ldap3::SearchEntry) -> Self {
        Self {
            dn: entry.dn,
            attrs: entry.attrs,
        }
    }
}

/// Экранирование значения в LDAP-фильтре (RFC 4515)
pub fn ldap_escape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\5c"),
            '*' => result.push_str("\\2a"),
            '(' => result.push_str("\\28"),
            ')' => result.push_str("\\29"),
            '\0' => result.push_str("\\00"),
            _ => result.push(c),
        }
    }
    result
}
