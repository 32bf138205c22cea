//! Fade transitions between screens. `ScreenManager` is stepped here once per frame and its
//! current screen is mirrored into Bevy's `State<Screen>`, so each screen's `OnEnter`/`OnExit`
//! systems run when the manager swaps. A fullscreen black node paints the fade on top of all UI.

use bevy::color::Alpha;
use bevy::prelude::*;

use crate::app::GameSet;
use crate::screen::{Screen, ScreenManager, DEFAULT_TRANSITION_FRAMES};
use crate::settings::GameSettings;

/// Registers the screen manager, the mirrored engine state and the fade overlay.
pub struct TransitionPlugin;

impl Plugin for TransitionPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<ScreenManager>() {
            let frames = app
                .world()
                .get_resource::<GameSettings>()
                .map_or(DEFAULT_TRANSITION_FRAMES, |s| s.transition_frames);
            app.insert_resource(ScreenManager::new(Screen::Loading, frames));
        }
        let initial = app.world().resource::<ScreenManager>().current_state();

        app.insert_state(initial)
            .add_systems(Startup, spawn_fade_overlay)
            .add_systems(Update, advance_screens.in_set(GameSet::Advance))
            .add_systems(
                Update,
                (sync_engine_state, update_fade_overlay).in_set(GameSet::Present),
            );
    }
}

/// Marker for the fullscreen fade node.
#[derive(Component)]
pub struct FadeOverlay;

fn spawn_fade_overlay(mut commands: Commands) {
    commands.spawn((
        FadeOverlay,
        Name::new("FadeOverlay"),
        NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
            background_color: BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.0)),
            // Above every screen root.
            z_index: ZIndex::Global(1000),
            ..default()
        },
    ));
}

/// One countdown step per rendered frame.
fn advance_screens(mut manager: ResMut<ScreenManager>) {
    manager.tick();
}

/// Queues an engine state change whenever the manager's screen differs. `NextState` is applied
/// by Bevy's `StateTransition` schedule at the start of the next frame.
fn sync_engine_state(
    manager: Res<ScreenManager>,
    state: Res<State<Screen>>,
    mut next_state: ResMut<NextState<Screen>>,
) {
    let current = manager.current_state();
    if *state.get() != current {
        next_state.set(current);
    }
}

fn update_fade_overlay(
    manager: Res<ScreenManager>,
    mut overlay_query: Query<&mut BackgroundColor, With<FadeOverlay>>,
) {
    let alpha = f32::from(manager.fade_alpha()) / 255.0;
    for mut background in &mut overlay_query {
        if background.0.alpha() != alpha {
            background.0.set_alpha(alpha);
        }
    }
}
