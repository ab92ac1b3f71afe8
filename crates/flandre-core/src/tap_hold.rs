use crate::config::{ModifierRelease, PendingPolicy, Settings};
use crate::keymap::TapHoldBinding;
use crate::output::Reporter;
use crate::types::{KeyId, Modifier, Timestamp};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Press record of a tap-hold key awaiting its release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTapHold {
    pub key: KeyId,
    pub t_down: Timestamp,
}

/// How a release was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Press recorded; decided on release.
    Pending,
    Tap,
    Hold,
    /// Release of a key whose press was consumed elsewhere.
    Ignored,
}

#[derive(Debug, Default)]
pub struct TapHoldResolver {
    pending: Vec<PendingTapHold>,
    // Keys currently holding each modifier active.
    mod_owners: HashMap<Modifier, HashSet<KeyId>>,
    // Keys whose press was consumed; their release is swallowed.
    suppressed: HashSet<KeyId>,
}

impl TapHoldResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[PendingTapHold] {
        &self.pending
    }

    pub fn handle(
        &mut self,
        pressed: bool,
        binding: TapHoldBinding,
        key: KeyId,
        now: Timestamp,
        settings: &Settings,
        out: &mut impl Reporter,
    ) -> Resolution {
        if pressed {
            self.press(binding, key, now, settings.pending_policy, out);
            return Resolution::Pending;
        }
        self.release(binding, key, now, settings, out)
    }

    fn press(
        &mut self,
        binding: TapHoldBinding,
        key: KeyId,
        now: Timestamp,
        policy: PendingPolicy,
        out: &mut impl Reporter,
    ) {
        self.suppressed.remove(&key);
        match policy {
            PendingPolicy::SingleSlot => self.pending.clear(),
            PendingPolicy::PerKey => self.pending.retain(|p| p.key != key),
        }
        self.pending.push(PendingTapHold { key, t_down: now });

        // Activate right away so the hold modifier works in chords before
        // the term has elapsed.
        if let Some(m) = binding.hold.modifier() {
            self.acquire_modifier(m, key, out);
        }
    }

    fn release(
        &mut self,
        binding: TapHoldBinding,
        key: KeyId,
        now: Timestamp,
        settings: &Settings,
        out: &mut impl Reporter,
    ) -> Resolution {
        if self.suppressed.remove(&key) {
            debug!("TapHold: {:#06x} release suppressed", key.code);
            return Resolution::Ignored;
        }

        let record = self
            .pending
            .iter()
            .position(|p| p.key == key)
            .map(|i| self.pending.swap_remove(i));

        let is_tap = match record {
            Some(p) => now.elapsed_since(p.t_down) < settings.tapping_term_ms,
            // A later press took the shared slot.
            None if settings.pending_policy == PendingPolicy::SingleSlot => false,
            None => {
                debug!("TapHold: {:#06x} released without press record", key.code);
                return Resolution::Ignored;
            }
        };

        if is_tap {
            if let Some(m) = binding.hold.modifier() {
                self.release_modifier(m, key, out);
            }
            debug!("TapHold: {:#06x} tap -> {:?}", key.code, binding.tap);
            out.emit_tap(binding.tap);
            return Resolution::Tap;
        }

        match binding.hold.modifier() {
            Some(m) => match settings.modifier_release {
                ModifierRelease::OnKeyRelease => self.release_modifier(m, key, out),
                ModifierRelease::Leave => self.disown_modifier(m, key),
            },
            None => out.emit_tap(binding.hold),
        }
        debug!("TapHold: {:#06x} hold -> {:?}", key.code, binding.hold);
        Resolution::Hold
    }

    /// Forget `key`'s press and roll back its speculative modifier. The next
    /// release of `key` is swallowed.
    pub fn cancel(&mut self, key: KeyId, binding: TapHoldBinding, out: &mut impl Reporter) {
        self.pending.retain(|p| p.key != key);
        if let Some(m) = binding.hold.modifier() {
            self.release_modifier(m, key, out);
        }
        self.suppressed.insert(key);
    }

    pub fn reset(&mut self) {
        self.pending.clear();
        self.mod_owners.clear();
        self.suppressed.clear();
    }

    fn acquire_modifier(&mut self, m: Modifier, key: KeyId, out: &mut impl Reporter) {
        let owners = self.mod_owners.entry(m).or_default();
        if owners.is_empty() {
            out.set_modifier_active(m, true);
        }
        owners.insert(key);
    }

    fn release_modifier(&mut self, m: Modifier, key: KeyId, out: &mut impl Reporter) {
        let Some(owners) = self.mod_owners.get_mut(&m) else {
            return;
        };
        if owners.remove(&key) && owners.is_empty() {
            out.set_modifier_active(m, false);
        }
    }

    fn disown_modifier(&mut self, m: Modifier, key: KeyId) {
        if let Some(owners) = self.mod_owners.get_mut(&m) {
            owners.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{Recorder, Report};
    use crate::types::KeyCode;

    const A: KeyId = KeyId::new(1);
    const B: KeyId = KeyId::new(2);

    fn quote() -> TapHoldBinding {
        TapHoldBinding::new(KeyCode::DoubleQuote, KeyCode::Quote)
    }

    fn space_shift() -> TapHoldBinding {
        TapHoldBinding::new(KeyCode::Space, KeyCode::Mod(Modifier::LeftShift))
    }

    fn run(
        th: &mut TapHoldResolver,
        settings: &Settings,
        out: &mut Recorder,
        steps: &[(KeyId, bool, u16, TapHoldBinding)],
    ) -> Vec<Resolution> {
        steps
            .iter()
            .map(|(k, p, t, b)| th.handle(*p, *b, *k, Timestamp(*t), settings, &mut *out))
            .collect()
    }

    #[test]
    fn short_press_is_tap() {
        let mut th = TapHoldResolver::new();
        let mut out = Recorder::new();
        let s = Settings::default();
        let res = run(&mut th, &s, &mut out, &[(A, true, 0, quote()), (A, false, 150, quote())]);
        assert_eq!(res[1], Resolution::Tap);
        assert_eq!(out.taps(), vec![KeyCode::DoubleQuote]);
        assert!(th.pending().is_empty());
    }

    #[test]
    fn term_boundary_is_hold() {
        let mut th = TapHoldResolver::new();
        let mut out = Recorder::new();
        let s = Settings::default();
        run(&mut th, &s, &mut out, &[(A, true, 0, quote()), (A, false, 199, quote())]);
        run(&mut th, &s, &mut out, &[(A, true, 500, quote()), (A, false, 700, quote())]);
        assert_eq!(out.taps(), vec![KeyCode::DoubleQuote, KeyCode::Quote]);
    }

    #[test]
    fn tap_across_timer_wrap() {
        let mut th = TapHoldResolver::new();
        let mut out = Recorder::new();
        let s = Settings::default();
        let res = run(
            &mut th,
            &s,
            &mut out,
            &[(A, true, u16::MAX - 20, quote()), (A, false, 30, quote())],
        );
        assert_eq!(res[1], Resolution::Tap);
    }

    #[test]
    fn modifier_hold_is_active_from_press_and_rolled_back_on_tap() {
        let mut th = TapHoldResolver::new();
        let mut out = Recorder::new();
        let s = Settings::default();
        th.handle(true, space_shift(), A, Timestamp(0), &s, &mut out);
        assert!(out.modifiers().contains(Modifier::LeftShift));

        th.handle(false, space_shift(), A, Timestamp(80), &s, &mut out);
        assert_eq!(
            out.reports(),
            &[
                Report::ModOn(Modifier::LeftShift),
                Report::ModOff(Modifier::LeftShift),
                Report::Tap(KeyCode::Space),
            ]
        );
    }

    #[test]
    fn modifier_hold_released_with_its_key() {
        let mut th = TapHoldResolver::new();
        let mut out = Recorder::new();
        let s = Settings::default();
        th.handle(true, space_shift(), A, Timestamp(0), &s, &mut out);
        let res = th.handle(false, space_shift(), A, Timestamp(400), &s, &mut out);
        assert_eq!(res, Resolution::Hold);
        assert!(out.modifiers().is_empty());
        assert!(out.taps().is_empty());
    }

    #[test]
    fn leave_policy_keeps_modifier_active_after_hold() {
        let mut th = TapHoldResolver::new();
        let mut out = Recorder::new();
        let s = Settings {
            modifier_release: ModifierRelease::Leave,
            ..Settings::default()
        };
        th.handle(true, space_shift(), A, Timestamp(0), &s, &mut out);
        th.handle(false, space_shift(), A, Timestamp(400), &s, &mut out);
        assert!(out.modifiers().contains(Modifier::LeftShift));

        // A later tap of the same binding still rolls it back.
        th.handle(true, space_shift(), A, Timestamp(500), &s, &mut out);
        th.handle(false, space_shift(), A, Timestamp(550), &s, &mut out);
        assert!(out.modifiers().is_empty());
    }

    #[test]
    fn shared_modifier_stays_until_last_owner_releases() {
        let mut th = TapHoldResolver::new();
        let mut out = Recorder::new();
        let s = Settings::default();
        th.handle(true, space_shift(), A, Timestamp(0), &s, &mut out);
        th.handle(true, space_shift(), B, Timestamp(10), &s, &mut out);
        th.handle(false, space_shift(), A, Timestamp(400), &s, &mut out);
        assert!(out.modifiers().contains(Modifier::LeftShift));
        th.handle(false, space_shift(), B, Timestamp(450), &s, &mut out);
        assert!(out.modifiers().is_empty());
    }

    #[test]
    fn rollover_per_key_resolves_each_independently() {
        let mut th = TapHoldResolver::new();
        let mut out = Recorder::new();
        let s = Settings::default();
        let paren = TapHoldBinding::new(KeyCode::LeftParen, KeyCode::RightParen);
        run(
            &mut th,
            &s,
            &mut out,
            &[
                (A, true, 0, quote()),
                (B, true, 50, paren),
                (A, false, 100, quote()),
                (B, false, 120, paren),
            ],
        );
        assert_eq!(out.taps(), vec![KeyCode::DoubleQuote, KeyCode::LeftParen]);
    }

    #[test]
    fn rollover_single_slot_turns_first_key_into_hold() {
        let mut th = TapHoldResolver::new();
        let mut out = Recorder::new();
        let s = Settings::legacy();
        let paren = TapHoldBinding::new(KeyCode::LeftParen, KeyCode::RightParen);
        let res = run(
            &mut th,
            &s,
            &mut out,
            &[
                (A, true, 0, quote()),
                (B, true, 50, paren),
                (A, false, 100, quote()),
                (B, false, 120, paren),
            ],
        );
        assert_eq!(res[2], Resolution::Hold);
        assert_eq!(out.taps(), vec![KeyCode::Quote, KeyCode::LeftParen]);
    }

    #[test]
    fn cancelled_key_release_is_swallowed() {
        let mut th = TapHoldResolver::new();
        let mut out = Recorder::new();
        let s = Settings::default();
        th.handle(true, space_shift(), A, Timestamp(0), &s, &mut out);
        th.cancel(A, space_shift(), &mut out);
        assert!(out.modifiers().is_empty());
        assert!(th.pending().is_empty());

        let res = th.handle(false, space_shift(), A, Timestamp(50), &s, &mut out);
        assert_eq!(res, Resolution::Ignored);
        assert!(out.taps().is_empty());

        // The next press is tracked normally again.
        th.handle(true, space_shift(), A, Timestamp(100), &s, &mut out);
        let res = th.handle(false, space_shift(), A, Timestamp(150), &s, &mut out);
        assert_eq!(res, Resolution::Tap);
    }

    #[test]
    fn release_without_press_is_ignored_per_key() {
        let mut th = TapHoldResolver::new();
        let mut out = Recorder::new();
        let res = th.handle(false, quote(), A, Timestamp(10), &Settings::default(), &mut out);
        assert_eq!(res, Resolution::Ignored);
        assert!(out.reports().is_empty());
    }
}
