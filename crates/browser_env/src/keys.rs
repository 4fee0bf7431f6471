//! Key-combination parsing for `press [...]` actions.

use crate::env::EnvError;

pub const MODIFIER_ALT: i64 = 1;
pub const MODIFIER_CONTROL: i64 = 2;
pub const MODIFIER_META: i64 = 4;
pub const MODIFIER_SHIFT: i64 = 8;

/// One key as `Input.dispatchKeyEvent` wants it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStroke {
    pub key: String,
    pub code: String,
    pub windows_virtual_key_code: Option<i64>,
    /// Character the key produces, if any.
    pub text: Option<String>,
}

/// A parsed combination such as `Control+Shift+a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub modifiers: i64,
    /// Modifier keys in the order they are held down.
    pub held: Vec<KeyStroke>,
    pub key: KeyStroke,
}

impl KeyCombo {
    pub fn parse(raw: &str) -> Result<Self, EnvError> {
        let raw = raw.trim();
        let invalid = || EnvError::InvalidKeys(raw.to_string());
        if raw.is_empty() {
            return Err(invalid());
        }

        let parts: Vec<&str> = raw.split('+').map(str::trim).collect();
        let (last, modifiers_part) = parts.split_last().ok_or_else(invalid)?;

        let mut modifiers = 0;
        let mut held = Vec::new();
        for part in modifiers_part {
            let (bit, stroke) = modifier(part).ok_or_else(invalid)?;
            if modifiers & bit == 0 {
                modifiers |= bit;
                held.push(stroke);
            }
        }

        let mut key = named_key(last)
            .or_else(|| character_key(last))
            .or_else(|| modifier(last).map(|(_, stroke)| stroke))
            .ok_or_else(invalid)?;

        // Shortcuts must not insert their character into the page.
        if modifiers & (MODIFIER_CONTROL | MODIFIER_ALT | MODIFIER_META) != 0 {
            key.text = None;
        } else if modifiers & MODIFIER_SHIFT != 0 {
            key.text = key.text.map(|text| text.to_uppercase());
        }

        Ok(Self {
            modifiers,
            held,
            key,
        })
    }
}

fn stroke(key: &str, code: &str, vk: i64, text: Option<&str>) -> KeyStroke {
    KeyStroke {
        key: key.to_string(),
        code: code.to_string(),
        windows_virtual_key_code: Some(vk),
        text: text.map(str::to_string),
    }
}

fn modifier(name: &str) -> Option<(i64, KeyStroke)> {
    match name.to_ascii_lowercase().as_str() {
        "alt" | "option" => Some((MODIFIER_ALT, stroke("Alt", "AltLeft", 18, None))),
        "control" | "ctrl" => Some((MODIFIER_CONTROL, stroke("Control", "ControlLeft", 17, None))),
        "meta" | "cmd" | "command" => Some((MODIFIER_META, stroke("Meta", "MetaLeft", 91, None))),
        "shift" => Some((MODIFIER_SHIFT, stroke("Shift", "ShiftLeft", 16, None))),
        _ => None,
    }
}

fn named_key(name: &str) -> Option<KeyStroke> {
    let key = match name.to_ascii_lowercase().as_str() {
        "enter" | "return" => stroke("Enter", "Enter", 13, Some("\r")),
        "tab" => stroke("Tab", "Tab", 9, Some("\t")),
        "backspace" => stroke("Backspace", "Backspace", 8, None),
        "escape" | "esc" => stroke("Escape", "Escape", 27, None),
        "delete" | "del" => stroke("Delete", "Delete", 46, None),
        "arrowleft" | "left" => stroke("ArrowLeft", "ArrowLeft", 37, None),
        "arrowup" | "up" => stroke("ArrowUp", "ArrowUp", 38, None),
        "arrowright" | "right" => stroke("ArrowRight", "ArrowRight", 39, None),
        "arrowdown" | "down" => stroke("ArrowDown", "ArrowDown", 40, None),
        "pageup" => stroke("PageUp", "PageUp", 33, None),
        "pagedown" => stroke("PageDown", "PageDown", 34, None),
        "home" => stroke("Home", "Home", 36, None),
        "end" => stroke("End", "End", 35, None),
        "space" => stroke(" ", "Space", 32, Some(" ")),
        _ => return None,
    };
    Some(key)
}

fn character_key(name: &str) -> Option<KeyStroke> {
    let mut chars = name.chars();
    let ch = chars.next()?;
    if chars.next().is_some() || !ch.is_ascii_graphic() {
        return None;
    }

    let text = ch.to_string();
    let (code, vk) = if ch.is_ascii_alphabetic() {
        let upper = ch.to_ascii_uppercase();
        (format!("Key{upper}"), upper as i64)
    } else if ch.is_ascii_digit() {
        (format!("Digit{ch}"), ch as i64)
    } else {
        (String::new(), 0)
    };

    Some(KeyStroke {
        key: text.clone(),
        code,
        windows_virtual_key_code: (vk != 0).then_some(vk),
        text: Some(text),
    })
}

#[cfg(test)]
#[path = "tests/keys_tests.rs"]
mod tests;
