//! High-level plugin composition.
//!
//! The `CodeBreakPlugin` glues together the screen manager, the per-screen UI, settings, audio and
//! the placeholder gameplay run, and fixes the per-frame system order. Each subsystem owns its own
//! resources; this orchestrator merely registers them with the Bevy application.

use bevy::prelude::*;

use crate::audio::GameAudioPlugin;
use crate::gameplay::GameplayPlugin;
use crate::leaderboard::Leaderboard;
use crate::settings::SettingsPlugin;
use crate::transition::TransitionPlugin;
use crate::ui::UiPlugin;

/// Bundles every plugin the game needs into a single unit that can be added to the Bevy `App`.
pub struct CodeBreakPlugin;

impl Plugin for CodeBreakPlugin {
    fn build(&self, app: &mut App) {
        // Settings first: the transition plugin reads the fade duration from them.
        app.add_plugins(SettingsPlugin)
            .add_plugins((
                TransitionPlugin, // Screen manager + fade overlay.
                GameAudioPlugin,  // Audio handle preloading + playback.
                UiPlugin,         // One root node per screen.
                GameplayPlugin,   // Placeholder survival run.
            ))
            .init_resource::<Leaderboard>()
            // Per frame: step the fade first, then let screens react to input (which may request
            // new transitions), then mirror the result into the engine state and the overlay.
            .configure_sets(
                Update,
                (GameSet::Advance, GameSet::Input, GameSet::Present).chain(),
            )
            .add_systems(Startup, setup_camera);
    }
}

/// Named system sets to structure the Update schedule.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameSet {
    Advance,
    Input,
    Present,
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((Name::new("MainCamera"), Camera2dBundle::default()));
}
