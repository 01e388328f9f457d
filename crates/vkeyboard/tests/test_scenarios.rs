//! End-to-end typing scenarios through the public keyboard API.

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use proptest::prelude::*;
    use vkeyboard::{
        KeyKind, KeyState, Keyboard, Layout, Point, Rect, Result, Variant, presets,
    };

    type Log = Rc<RefCell<Vec<String>>>;

    /// A keyboard in a 480x800 area whose consumer records every
    /// notification.
    fn keyboard(layout: Layout) -> Result<(Keyboard, Log)> {
        let log: Log = Rc::default();
        let sink = Rc::clone(&log);
        let kb = Keyboard::builder(Rect::new(0, 0, 480, 800))
            .layout(layout)
            .consumer(move |t| sink.borrow_mut().push(t.to_owned()))
            .build()?;
        Ok((kb, log))
    }

    fn bare_number() -> Result<Layout> {
        Layout::builder(presets::NUMBER)
            .allow_uppercase(false)
            .allow_special_chars(false)
            .allow_space(false)
            .build()
    }

    /// Centre of the first key matching `pred`.
    fn find(kb: &Keyboard, pred: impl Fn(&vkeyboard::Key) -> bool) -> Option<Point> {
        kb.keys().iter().find(|k| pred(k)).map(|k| k.rect.center())
    }

    fn tap(kb: &mut Keyboard, p: Point) {
        kb.press(p);
        kb.release(p);
    }

    #[test]
    fn number_pad_typing() -> Result<()> {
        let (mut kb, log) = keyboard(bare_number()?)?;
        kb.enable();
        let five = find(&kb, |k| k.spec.value == Some('5')).expect("5 key");
        let back = find(&kb, |k| k.spec.kind == KeyKind::Backspace).expect("backspace key");

        tap(&mut kb, five);
        assert_eq!(kb.get_text(), "5");
        tap(&mut kb, back);
        assert_eq!(kb.get_text(), "");
        tap(&mut kb, back);
        assert_eq!(kb.get_text(), "");
        assert_eq!(*log.borrow(), vec!["5", ""]);
        Ok(())
    }

    #[test]
    fn azerty_uppercase() -> Result<()> {
        let (mut kb, log) = keyboard(Layout::new(presets::AZERTY)?)?;
        kb.enable();
        let shift = find(&kb, |k| k.spec.kind == KeyKind::UppercaseToggle).expect("shift key");
        tap(&mut kb, shift);
        assert_eq!(kb.variant(), Variant::Uppercase);
        assert!(log.borrow().is_empty());

        let a = find(&kb, |k| k.spec.value == Some('A')).expect("uppercase A key");
        tap(&mut kb, a);
        assert_eq!(kb.get_text(), "A");
        Ok(())
    }

    #[test]
    fn no_space_key_when_disallowed() -> Result<()> {
        let (mut kb, _) = keyboard(bare_number()?)?;
        kb.enable();
        assert!(kb.keys().iter().all(|k| k.spec.kind != KeyKind::Space));
        Ok(())
    }

    #[test]
    fn stray_release_is_ignored() -> Result<()> {
        let (mut kb, log) = keyboard(bare_number()?)?;
        kb.enable();
        let before = kb.keys().to_vec();
        assert!(kb.release(Point { x: 1, y: 1 }).is_empty());
        let first = kb.keys()[0].rect.center();
        assert!(kb.release(first).is_empty());
        assert_eq!(kb.keys(), before.as_slice());
        assert_eq!(kb.get_text(), "");
        assert!(log.borrow().is_empty());
        Ok(())
    }

    #[test]
    fn enable_is_idempotent() -> Result<()> {
        let (mut kb, _) = keyboard(Layout::new(presets::QWERTY)?)?;
        kb.enable();
        let keys = kb.keys().to_vec();
        assert!(kb.enable().is_empty());
        assert!(kb.is_enabled());
        assert_eq!(kb.variant(), Variant::Lowercase);
        assert_eq!(kb.keys(), keys.as_slice());
        Ok(())
    }

    #[test]
    fn disabled_keyboard_ignores_input() -> Result<()> {
        let (mut kb, log) = keyboard(bare_number()?)?;
        kb.enable();
        let one = kb.keys()[0].rect.center();
        kb.disable();
        assert!(kb.press(one).is_empty());
        assert!(kb.release(one).is_empty());
        assert_eq!(kb.get_text(), "");

        // Text can still be set programmatically.
        assert!(kb.set_text("42").is_empty());
        assert_eq!(kb.get_text(), "42");
        assert_eq!(*log.borrow(), vec!["42"]);
        Ok(())
    }

    #[test]
    fn disable_while_pressed() -> Result<()> {
        let (mut kb, _) = keyboard(bare_number()?)?;
        kb.enable();
        let one = kb.keys()[0].rect.center();
        kb.press(one);
        assert_eq!(kb.keys()[0].state, KeyState::Pressed);
        kb.disable();
        kb.enable();
        assert_eq!(kb.keys()[0].state, KeyState::Released);
        kb.release(one);
        assert_eq!(kb.get_text(), "");
        Ok(())
    }

    #[test]
    fn empty_layout_is_rejected() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            Layout::new(&empty),
            Err(vkeyboard::Error::Configuration(_))
        ));
    }

    #[test]
    fn bounds_enclose_keys() -> Result<()> {
        let (mut kb, _) = keyboard(Layout::new(presets::AZERTY)?)?;
        kb.enable();
        let bounds = kb.get_bounds();
        assert_eq!(bounds.bottom(), 800);
        assert!(kb.keys().iter().all(|k| bounds.contains_rect(k.rect)));
        Ok(())
    }

    proptest! {
        #[test]
        fn set_text_round_trip(s in "[a-z0-9 ]{0,24}") {
            let layout = Layout::new(presets::AZERTY)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            let (mut kb, _) = keyboard(layout)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            kb.set_text(&s);
            prop_assert_eq!(kb.get_text(), s.as_str());
            prop_assert_eq!(kb.cursor(), s.chars().count());
        }

        #[test]
        fn tapping_a_character_inserts_it(idx in 0usize..40, prefix in "[0-9]{0,6}", back in 0usize..6) {
            let layout = Layout::new(presets::QWERTY)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            let (mut kb, log) = keyboard(layout)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            kb.enable();
            kb.set_text(&prefix);
            for _ in 0..back {
                kb.move_cursor(vkeyboard::CursorMotion::Left);
            }
            let chars: Vec<_> = kb
                .keys()
                .iter()
                .filter(|k| k.spec.kind == KeyKind::Character)
                .copied()
                .collect();
            let key = chars[idx % chars.len()];
            let c = key.spec.value.unwrap_or_default();
            let at = kb.cursor();
            log.borrow_mut().clear();

            tap(&mut kb, key.rect.center());

            let mut expected: Vec<char> = prefix.chars().collect();
            expected.insert(at, c);
            let expected: String = expected.into_iter().collect();
            prop_assert_eq!(kb.get_text(), expected.as_str());
            prop_assert_eq!(kb.cursor(), at + 1);
            prop_assert_eq!(log.borrow().clone(), vec![expected.clone()]);
        }
    }
}
