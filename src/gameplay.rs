//! Placeholder survival run. Stands in for the real arena so the screen flow around it (pause,
//! game over, leaderboard) has something to pause and score.

use bevy::prelude::*;

use crate::app::GameSet;
use crate::leaderboard::Leaderboard;
use crate::screen::{Screen, ScreenManager};

pub const POINTS_PER_SECOND: u32 = 10;
const PLAYER_NAME: &str = "Player";

/// Starts runs on entering gameplay and ends them on `Enter` or when the player quits to menu.
pub struct GameplayPlugin;

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RunStats>()
            .add_systems(OnEnter(Screen::Gameplay), (begin_run, spawn_hud).chain())
            .add_systems(OnEnter(Screen::Menu), abandon_run)
            .add_systems(
                Update,
                (advance_run, gameplay_input, update_hud)
                    .chain()
                    .in_set(GameSet::Input)
                    .run_if(in_state(Screen::Gameplay)),
            )
            // The HUD stays up behind the pause overlay until the run is over.
            .add_systems(OnEnter(Screen::Menu), despawn_hud)
            .add_systems(OnEnter(Screen::GameOver), despawn_hud);
    }
}

/// Progress of the current run. `active` stays set while the run is paused.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct RunStats {
    pub survival_time: f32,
    pub active: bool,
}

impl RunStats {
    pub fn start(&mut self) {
        self.survival_time = 0.0;
        self.active = true;
    }

    pub fn advance(&mut self, dt: f32) {
        if self.active {
            self.survival_time += dt;
        }
    }

    pub fn survival_secs(&self) -> u32 {
        self.survival_time.max(0.0).floor() as u32
    }

    pub fn score(&self) -> u32 {
        self.survival_secs() * POINTS_PER_SECOND
    }
}

#[derive(Component)]
struct GameplayHud;

#[derive(Component)]
struct HudText;

fn begin_run(mut stats: ResMut<RunStats>) {
    if stats.active {
        return;
    }
    stats.start();
    info!("New run started");
}

fn abandon_run(mut stats: ResMut<RunStats>) {
    if stats.active {
        info!("Run abandoned after {}s", stats.survival_secs());
        stats.active = false;
    }
}

fn advance_run(time: Res<Time>, mut stats: ResMut<RunStats>) {
    stats.advance(time.delta_seconds());
}

fn gameplay_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut manager: ResMut<ScreenManager>,
    mut stats: ResMut<RunStats>,
    mut leaderboard: ResMut<Leaderboard>,
) {
    if manager.is_transitioning() {
        return;
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        manager.transition_to(Screen::Pause, true);
    } else if keyboard.just_pressed(KeyCode::Enter) {
        stats.active = false;
        leaderboard.record(PLAYER_NAME, stats.score(), stats.survival_secs());
        info!(
            "Run over: score {} after {}s",
            stats.score(),
            stats.survival_secs()
        );
        manager.transition_to(Screen::GameOver, true);
    }
}

fn spawn_hud(mut commands: Commands, existing: Query<(), With<GameplayHud>>) {
    if !existing.is_empty() {
        return;
    }
    commands
        .spawn((
            GameplayHud,
            Name::new("GameplayHud"),
            NodeBundle {
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    flex_direction: FlexDirection::Column,
                    justify_content: JustifyContent::SpaceBetween,
                    padding: UiRect::all(Val::Px(16.0)),
                    ..default()
                },
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                HudText,
                TextBundle::from_section(
                    "",
                    TextStyle {
                        font_size: 28.0,
                        color: Color::srgb(0.9, 0.9, 0.9),
                        ..default()
                    },
                ),
            ));
            parent.spawn(TextBundle::from_section(
                "ESC to pause  |  ENTER to end the run",
                TextStyle {
                    font_size: 18.0,
                    color: Color::srgba(0.9, 0.9, 0.9, 0.6),
                    ..default()
                },
            ));
        });
}

fn update_hud(stats: Res<RunStats>, mut texts: Query<&mut Text, With<HudText>>) {
    for mut text in &mut texts {
        text.sections[0].value = format!(
            "Survived: {}s    Score: {}",
            stats.survival_secs(),
            stats.score()
        );
    }
}

fn despawn_hud(mut commands: Commands, query: Query<Entity, With<GameplayHud>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}
