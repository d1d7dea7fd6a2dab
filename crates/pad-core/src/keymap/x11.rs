//! Canonical key name → X11 keysym name table.
//!
//! The names returned here are what `XStringToKeysym` accepts.  Letters and
//! digits are their own keysym names, so single characters that are not
//! listed pass through unchanged.

use std::borrow::Cow;

use super::Modifier;

/// Translates a canonical key name into an X11 keysym name.
///
/// # Examples
///
/// ```rust
/// use pad_core::keymap::x11::keysym_name;
///
/// assert_eq!(keysym_name("escape"), "Escape");
/// assert_eq!(keysym_name("a"), "a");
/// ```
pub fn keysym_name(key: &str) -> Cow<'_, str> {
    let mapped = match key {
        "enter" | "return" => "Return",
        "tab" => "Tab",
        "escape" => "Escape",
        "backspace" => "BackSpace",
        "space" | " " => "space",
        "up" => "Up",
        "down" => "Down",
        "left" => "Left",
        "right" => "Right",
        "home" => "Home",
        "end" => "End",
        "pageup" => "Page_Up",
        "pagedown" => "Page_Down",
        "=" => "equal",
        "-" => "minus",
        "+" => "plus",
        "[" => "bracketleft",
        "]" => "bracketright",
        "," => "comma",
        "." => "period",
        "/" => "slash",
        ";" => "semicolon",
        "'" => "apostrophe",
        "`" => "grave",
        "\\" => "backslash",
        "\n" => "Return",
        "\t" => "Tab",
        other => {
            if let Some(n) = other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=24).contains(&n) {
                    return Cow::Owned(format!("F{n}"));
                }
            }
            return Cow::Borrowed(other);
        }
    };
    Cow::Borrowed(mapped)
}

/// Translates a modifier into the keysym of its left-hand key.
///
/// On X11 desktops the primary shortcut modifier is Control, so
/// [`Modifier::Command`] maps to `Control_L`.
pub fn modifier_keysym(modifier: Modifier) -> &'static str {
    match modifier {
        Modifier::Command | Modifier::Control => "Control_L",
        Modifier::Alt => "Alt_L",
        Modifier::Shift => "Shift_L",
    }
}

/// Keysym names for a chord in press order: modifiers first, without
/// duplicates, then the key.
pub fn chord_keysyms<'a>(key: &'a str, modifiers: &[Modifier]) -> Vec<Cow<'a, str>> {
    let mut names: Vec<Cow<'a, str>> = Vec::with_capacity(modifiers.len() + 1);
    for m in modifiers {
        let name = Cow::Borrowed(modifier_keysym(*m));
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names.push(keysym_name(key));
    names
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_keys_map_to_keysyms() {
        assert_eq!(keysym_name("pageup"), "Page_Up");
        assert_eq!(keysym_name("backspace"), "BackSpace");
        assert_eq!(keysym_name("["), "bracketleft");
    }

    #[test]
    fn test_function_keys_are_capitalised() {
        assert_eq!(keysym_name("f11"), "F11");
        assert_eq!(keysym_name("f25"), "f25");
    }

    #[test]
    fn test_letters_pass_through() {
        assert_eq!(keysym_name("q"), "q");
    }

    #[test]
    fn test_chord_keysyms_presses_modifiers_first() {
        // Arrange
        let mods = [Modifier::Command, Modifier::Shift];

        // Act
        let names = chord_keysyms("=", &mods);

        // Assert
        assert_eq!(names, vec!["Control_L", "Shift_L", "equal"]);
    }

    #[test]
    fn test_chord_keysyms_deduplicates_control() {
        let names = chord_keysyms("up", &[Modifier::Command, Modifier::Control]);
        assert_eq!(names, vec!["Control_L", "Up"]);
    }

    #[test]
    fn test_chord_keysyms_without_modifiers_is_key_only() {
        assert_eq!(chord_keysyms("escape", &[]), vec!["Escape"]);
    }

    #[test]
    fn test_alt_maps_to_left_alt() {
        assert_eq!(modifier_keysym(Modifier::Alt), "Alt_L");
    }
}
