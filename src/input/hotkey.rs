use anyhow::{anyhow, Context, Result};
use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use tracing::info;

use crate::config::HotkeyConfig;

/// The single global toggle binding
///
/// Registration is capability-gated: environments without global-hotkey
/// support run button-only, so construction failure is reported to the
/// caller instead of aborting startup.
pub struct HotkeyBinding {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
}

impl HotkeyBinding {
    /// Register the configured binding with the OS
    ///
    /// # Errors
    /// Returns error if the hotkey backend is unavailable, the config
    /// names an unknown modifier or key, or registration is refused.
    pub fn try_bind(config: &HotkeyConfig) -> Result<Self> {
        let manager = GlobalHotKeyManager::new().context("failed to create hotkey manager")?;

        let modifiers = parse_modifiers(&config.modifiers)?;
        let code = parse_key(&config.key)?;

        let hotkey = HotKey::new(Some(modifiers), code);
        manager
            .register(hotkey)
            .context("failed to register hotkey")?;

        info!("registered hotkey: {:?} + {}", config.modifiers, config.key);

        Ok(Self { manager, hotkey })
    }

    /// Whether this event is a press of the registered binding
    #[must_use]
    pub fn is_toggle_press(&self, event: &GlobalHotKeyEvent) -> bool {
        event.id == self.hotkey.id() && event.state == HotKeyState::Pressed
    }
}

impl Drop for HotkeyBinding {
    fn drop(&mut self) {
        if let Err(e) = self.manager.unregister(self.hotkey) {
            tracing::error!("failed to unregister hotkey: {}", e);
        }
    }
}

fn parse_modifiers(modifiers: &[String]) -> Result<Modifiers> {
    let mut result = Modifiers::empty();
    for modifier in modifiers {
        match modifier.as_str() {
            "Control" | "Ctrl" => result |= Modifiers::CONTROL,
            "Alt" | "Option" => result |= Modifiers::ALT,
            "Super" | "Command" => result |= Modifiers::SUPER,
            "Shift" => result |= Modifiers::SHIFT,
            _ => return Err(anyhow!("unknown modifier: {}", modifier)),
        }
    }
    Ok(result)
}

fn parse_key(key: &str) -> Result<Code> {
    match key {
        "A" => Ok(Code::KeyA),
        "B" => Ok(Code::KeyB),
        "C" => Ok(Code::KeyC),
        "D" => Ok(Code::KeyD),
        "E" => Ok(Code::KeyE),
        "F" => Ok(Code::KeyF),
        "G" => Ok(Code::KeyG),
        "H" => Ok(Code::KeyH),
        "I" => Ok(Code::KeyI),
        "J" => Ok(Code::KeyJ),
        "K" => Ok(Code::KeyK),
        "L" => Ok(Code::KeyL),
        "M" => Ok(Code::KeyM),
        "N" => Ok(Code::KeyN),
        "O" => Ok(Code::KeyO),
        "P" => Ok(Code::KeyP),
        "Q" => Ok(Code::KeyQ),
        "R" => Ok(Code::KeyR),
        "S" => Ok(Code::KeyS),
        "T" => Ok(Code::KeyT),
        "U" => Ok(Code::KeyU),
        "V" => Ok(Code::KeyV),
        "W" => Ok(Code::KeyW),
        "X" => Ok(Code::KeyX),
        "Y" => Ok(Code::KeyY),
        "Z" => Ok(Code::KeyZ),
        "Space" => Ok(Code::Space),
        _ => Err(anyhow!("unsupported key: {}", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modifiers_default_binding() {
        let modifiers =
            parse_modifiers(&["Control".to_owned(), "Alt".to_owned()]).unwrap();
        assert_eq!(modifiers, Modifiers::CONTROL | Modifiers::ALT);
    }

    #[test]
    fn test_parse_modifiers_aliases() {
        assert_eq!(
            parse_modifiers(&["Ctrl".to_owned()]).unwrap(),
            Modifiers::CONTROL
        );
        assert_eq!(
            parse_modifiers(&["Option".to_owned()]).unwrap(),
            Modifiers::ALT
        );
    }

    #[test]
    fn test_parse_modifiers_unknown() {
        assert!(parse_modifiers(&["Hyper".to_owned()]).is_err());
    }

    #[test]
    fn test_parse_key_letters_and_space() {
        assert!(matches!(parse_key("R"), Ok(Code::KeyR)));
        assert!(matches!(parse_key("Z"), Ok(Code::KeyZ)));
        assert!(matches!(parse_key("Space"), Ok(Code::Space)));
    }

    #[test]
    fn test_parse_key_unsupported() {
        assert!(parse_key("F13").is_err());
        assert!(parse_key("r").is_err());
    }

    #[test]
    #[ignore = "requires a display server for hotkey registration"]
    fn test_try_bind_default_config() {
        let config = HotkeyConfig {
            modifiers: vec!["Control".to_owned(), "Alt".to_owned()],
            key: "R".to_owned(),
        };
        let binding = HotkeyBinding::try_bind(&config);
        assert!(binding.is_ok());
    }
}
