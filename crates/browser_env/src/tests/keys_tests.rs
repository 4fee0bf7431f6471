use super::*;

#[test]
fn parses_shortcut_with_modifiers() {
    let combo = KeyCombo::parse("Control+Shift+a").expect("combo");

    assert_eq!(combo.modifiers, MODIFIER_CONTROL | MODIFIER_SHIFT);
    assert_eq!(
        combo.held.iter().map(|k| k.key.as_str()).collect::<Vec<_>>(),
        vec!["Control", "Shift"]
    );
    assert_eq!(combo.key.code, "KeyA");
    assert_eq!(combo.key.windows_virtual_key_code, Some(65));
    assert_eq!(combo.key.text, None);
}

#[test]
fn accepts_common_aliases() {
    let combo = KeyCombo::parse("ctrl+v").expect("combo");
    assert_eq!(combo.modifiers, MODIFIER_CONTROL);
    assert_eq!(combo.key.key, "v");

    let combo = KeyCombo::parse("Cmd+Return").expect("combo");
    assert_eq!(combo.modifiers, MODIFIER_META);
    assert_eq!(combo.key.key, "Enter");
}

#[test]
fn named_keys_carry_virtual_codes() {
    let enter = KeyCombo::parse("Enter").expect("enter");
    assert_eq!(enter.modifiers, 0);
    assert_eq!(enter.key.windows_virtual_key_code, Some(13));
    assert_eq!(enter.key.text.as_deref(), Some("\r"));

    let down = KeyCombo::parse("PageDown").expect("page down");
    assert_eq!(down.key.windows_virtual_key_code, Some(34));
    assert_eq!(down.key.text, None);
}

#[test]
fn shift_uppercases_typed_character() {
    let combo = KeyCombo::parse("Shift+q").expect("combo");
    assert_eq!(combo.key.text.as_deref(), Some("Q"));
}

#[test]
fn repeated_modifiers_are_held_once() {
    let combo = KeyCombo::parse("Control+ctrl+c").expect("combo");
    assert_eq!(combo.held.len(), 1);
}

#[test]
fn rejects_unknown_keys() {
    assert!(matches!(KeyCombo::parse(""), Err(EnvError::InvalidKeys(_))));
    assert!(matches!(KeyCombo::parse("Hyper+x"), Err(EnvError::InvalidKeys(_))));
    assert!(matches!(KeyCombo::parse("Control+"), Err(EnvError::InvalidKeys(_))));
    assert!(matches!(KeyCombo::parse("F13"), Err(EnvError::InvalidKeys(_))));
}
