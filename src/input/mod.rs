/// Global hotkey binding
pub mod hotkey;

pub use hotkey::HotkeyBinding;
