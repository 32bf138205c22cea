//! Screen state machine. `ScreenManager` owns the active screen label plus an optional fade
//! transition counted in frames; Bevy's `State<Screen>` only mirrors it (see `transition.rs`).
//!
//! Everything here is plain data: no entities, no handles. The manager is stepped once per frame
//! by a single system, so a transition can never be advanced twice in the same frame.

use std::fmt;
use std::str::FromStr;

use bevy::prelude::*;

/// Frames a fade phase lasts unless the settings file says otherwise.
pub const DEFAULT_TRANSITION_FRAMES: u32 = 15;

/// Every logical screen the game can show.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum Screen {
    #[default]
    Menu,
    Gameplay,
    Pause,
    GameOver,
    Leaderboard,
    Settings,
    Loading,
}

impl Screen {
    pub const ALL: [Screen; 7] = [
        Screen::Menu,
        Screen::Gameplay,
        Screen::Pause,
        Screen::GameOver,
        Screen::Leaderboard,
        Screen::Settings,
        Screen::Loading,
    ];

    /// Canonical label, as used in the settings file and in log lines.
    pub fn label(self) -> &'static str {
        match self {
            Screen::Menu => "menu",
            Screen::Gameplay => "gameplay",
            Screen::Pause => "pause",
            Screen::GameOver => "game_over",
            Screen::Leaderboard => "leaderboard",
            Screen::Settings => "settings",
            Screen::Loading => "loading",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A label that names no known screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidScreen(pub String);

impl fmt::Display for InvalidScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid screen '{}'", self.0)
    }
}

impl std::error::Error for InvalidScreen {}

impl FromStr for Screen {
    type Err = InvalidScreen;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Screen::ALL
            .into_iter()
            .find(|screen| screen.label() == label)
            .ok_or_else(|| InvalidScreen(label.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadePhase {
    FadingOut,
    FadingIn,
}

/// In-flight fade. Only exists while `remaining > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub target: Screen,
    pub remaining: u32,
    pub phase: FadePhase,
}

/// Tracks the current screen and drives the fade between screens.
#[derive(Resource, Debug, Clone)]
pub struct ScreenManager {
    current: Screen,
    previous: Option<Screen>,
    transition: Option<Transition>,
    duration: u32,
    error: Option<String>,
}

impl Default for ScreenManager {
    fn default() -> Self {
        Self::new(Screen::Menu, DEFAULT_TRANSITION_FRAMES)
    }
}

impl ScreenManager {
    /// `duration` is clamped to at least one frame so the alpha ratio is always defined.
    pub fn new(initial: Screen, duration: u32) -> Self {
        Self {
            current: initial,
            previous: None,
            transition: None,
            duration: duration.max(1),
            error: None,
        }
    }

    pub fn current_state(&self) -> Screen {
        self.current
    }

    pub fn previous_state(&self) -> Option<Screen> {
        self.previous
    }

    /// Target of the in-flight fade, if any.
    pub fn next_state(&self) -> Option<Screen> {
        self.transition.map(|t| t.target)
    }

    pub fn transition(&self) -> Option<Transition> {
        self.transition
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Switches to `target`. Without a fade the swap is immediate and cancels any running fade;
    /// with a fade it (re)starts the fade-out and the swap happens in [`ScreenManager::tick`].
    pub fn transition_to(&mut self, target: Screen, use_fade: bool) {
        if use_fade {
            self.transition = Some(Transition {
                target,
                remaining: self.duration,
                phase: FadePhase::FadingOut,
            });
            debug!("Fading out of {} towards {}", self.current, target);
        } else {
            self.transition = None;
            self.swap(target);
        }
    }

    /// Label-based variant of [`ScreenManager::transition_to`]. Unknown labels are logged and
    /// ignored; the return value says whether the request was accepted.
    pub fn request(&mut self, label: &str, use_fade: bool) -> bool {
        match label.parse::<Screen>() {
            Ok(target) => {
                self.transition_to(target, use_fade);
                true
            }
            Err(err) => {
                warn!("Ignoring transition request: {err}");
                false
            }
        }
    }

    /// Advances the fade by one frame.
    pub fn tick(&mut self) {
        let Some(mut transition) = self.transition else {
            return;
        };

        transition.remaining = transition.remaining.saturating_sub(1);
        if transition.remaining > 0 {
            self.transition = Some(transition);
            return;
        }

        match transition.phase {
            FadePhase::FadingOut => {
                self.swap(transition.target);
                // Gameplay comes up without a fade-in so input is live right away.
                self.transition = (transition.target != Screen::Gameplay).then_some(Transition {
                    target: transition.target,
                    remaining: self.duration,
                    phase: FadePhase::FadingIn,
                });
            }
            FadePhase::FadingIn => self.transition = None,
        }
    }

    /// Overlay opacity in 0..=255, proportional to the frames left in the current phase.
    pub fn fade_alpha(&self) -> u8 {
        match self.transition {
            Some(t) => {
                let remaining = u64::from(t.remaining.min(self.duration));
                ((255 * remaining) / u64::from(self.duration)) as u8
            }
            None => 0,
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn swap(&mut self, target: Screen) {
        self.previous = Some(self.current);
        self.current = target;
        info!("Screen changed: {} -> {}", self.previous.unwrap_or(target), target);
    }
}
