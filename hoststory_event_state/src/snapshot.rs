// Copyright 2025 the Hoststory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native key events and their immutable snapshots.
//!
//! The host toolkit hands listeners a [`NativeKeyEvent`] that any of them may
//! mutate in place (most importantly the [`doit`](NativeKeyEvent::doit) flag).
//! A [`NativeEventSnapshot`] freezes the fields needed to recognize the same
//! event later and to replay it, independent of what listeners do afterwards.
//!
//! Snapshots compare by value. The host may hand out copies of an event rather
//! than the original object, so identity is never a usable key.
//!
//! ```
//! use hoststory_event_state::snapshot::{
//!     DisplayId, KeyEventKind, Modifiers, NativeEventSnapshot, NativeKeyEvent, WidgetId,
//! };
//!
//! let mut event = NativeKeyEvent::new(DisplayId(1), WidgetId(7), 100, KeyEventKind::Down)
//!     .with_character('a')
//!     .with_modifiers(Modifiers::SHIFT);
//! let before = NativeEventSnapshot::capture(&event);
//!
//! // A listener vetoes the event after the snapshot was taken.
//! event.doit = false;
//! assert!(before.is_actionable());
//! assert_ne!(before, NativeEventSnapshot::capture(&event));
//! ```

/// Identity of the host display (the toolkit's connection to the window system).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(pub u64);

/// Identity of a host widget.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub u64);

/// Whether a native key event reports a press or a release.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    /// Key went down.
    Down,
    /// Key went up.
    Up,
}

/// Phase of a key event as the embedded scene reports it.
///
/// The scene derives `Pressed` and `Typed` from a native [`KeyEventKind::Down`]
/// and `Released` from a native [`KeyEventKind::Up`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyPhase {
    /// Key pressed.
    Pressed,
    /// Character typed; derived from a press that produced a character.
    Typed,
    /// Key released.
    Released,
}

bitflags::bitflags! {
    /// Modifier state captured with an input event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u32 {
        /// Shift key held.
        const SHIFT   = 0b0000_0001;
        /// Control key held.
        const CONTROL = 0b0000_0010;
        /// Alt / Option key held.
        const ALT     = 0b0000_0100;
        /// Meta / Command / Super key held.
        const META    = 0b0000_1000;
    }
}

impl Modifiers {
    /// Shift held.
    pub fn shift(self) -> bool {
        self.contains(Self::SHIFT)
    }

    /// Control held.
    pub fn control(self) -> bool {
        self.contains(Self::CONTROL)
    }

    /// Alt held.
    pub fn alt(self) -> bool {
        self.contains(Self::ALT)
    }

    /// Meta held.
    pub fn meta(self) -> bool {
        self.contains(Self::META)
    }
}

/// A key event as the host toolkit delivers it to listeners.
///
/// Listeners receive `&mut NativeKeyEvent` and veto further processing by
/// clearing [`doit`](Self::doit).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NativeKeyEvent {
    /// Display the event was generated on.
    pub display: DisplayId,
    /// Widget the event targets.
    pub widget: WidgetId,
    /// Host timestamp in toolkit-native units.
    pub time: u64,
    /// Press or release.
    pub kind: KeyEventKind,
    /// `false` once a listener has decided the event must not be acted upon.
    pub doit: bool,
    /// Character produced by the key, `'\0'` if none.
    pub character: char,
    /// Host key code.
    pub key_code: u32,
    /// Host key location (left/right/keypad discriminator).
    pub key_location: u32,
    /// Modifier state at generation time.
    pub modifiers: Modifiers,
}

impl NativeKeyEvent {
    /// Create an actionable event with no character, key code or modifiers.
    pub fn new(display: DisplayId, widget: WidgetId, time: u64, kind: KeyEventKind) -> Self {
        Self {
            display,
            widget,
            time,
            kind,
            doit: true,
            character: '\0',
            key_code: 0,
            key_location: 0,
            modifiers: Modifiers::empty(),
        }
    }

    /// Set the produced character.
    #[must_use]
    pub fn with_character(mut self, character: char) -> Self {
        self.character = character;
        self
    }

    /// Set the host key code.
    #[must_use]
    pub fn with_key_code(mut self, key_code: u32) -> Self {
        self.key_code = key_code;
        self
    }

    /// Set the host key location.
    #[must_use]
    pub fn with_key_location(mut self, key_location: u32) -> Self {
        self.key_location = key_location;
        self
    }

    /// Set the modifier state.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Immutable copy of a [`NativeKeyEvent`].
///
/// Created at the instant the host generates the event, before any listener
/// runs, and never mutated afterwards. Equality covers every captured field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NativeEventSnapshot {
    display: DisplayId,
    widget: WidgetId,
    time: u64,
    kind: KeyEventKind,
    doit: bool,
    character: char,
    key_code: u32,
    key_location: u32,
    modifiers: Modifiers,
}

impl NativeEventSnapshot {
    /// Copy the fields of `event`.
    pub fn capture(event: &NativeKeyEvent) -> Self {
        Self {
            display: event.display,
            widget: event.widget,
            time: event.time,
            kind: event.kind,
            doit: event.doit,
            character: event.character,
            key_code: event.key_code,
            key_location: event.key_location,
            modifiers: event.modifiers,
        }
    }

    /// Rebuild a live event carrying the captured values, for replay.
    pub fn to_event(&self) -> NativeKeyEvent {
        NativeKeyEvent {
            display: self.display,
            widget: self.widget,
            time: self.time,
            kind: self.kind,
            doit: self.doit,
            character: self.character,
            key_code: self.key_code,
            key_location: self.key_location,
            modifiers: self.modifiers,
        }
    }

    /// Display the event was generated on.
    pub fn display(&self) -> DisplayId {
        self.display
    }

    /// Widget the event targets.
    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    /// Host timestamp.
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Press or release.
    pub fn kind(&self) -> KeyEventKind {
        self.kind
    }

    /// The captured `doit` flag.
    pub fn is_actionable(&self) -> bool {
        self.doit
    }

    /// Produced character, `'\0'` if none.
    pub fn character(&self) -> char {
        self.character
    }

    /// Host key code.
    pub fn key_code(&self) -> u32 {
        self.key_code
    }

    /// Host key location.
    pub fn key_location(&self) -> u32 {
        self.key_location
    }

    /// Modifier state.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}
