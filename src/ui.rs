//! Screen renderers and the button layer.
//!
//! Every screen except gameplay gets one root UI node, spawned on `OnEnter` and despawned on
//! `OnExit`. Buttons carry a `MenuAction`; pressing one either edits the settings resource or asks
//! the `ScreenManager` for a faded transition. Despawning a root drops all of its children.

use bevy::app::AppExit;
use bevy::prelude::*;

use crate::app::GameSet;
use crate::audio::{AudioHandles, MenuSelect};
use crate::gameplay::RunStats;
use crate::leaderboard::Leaderboard;
use crate::screen::{Screen, ScreenManager};
use crate::settings::{GameSettings, SettingsPath, VOLUME_STEP};

const BG_COLOR: Color = Color::srgb(0.04, 0.04, 0.08);
const NEON_BLUE: Color = Color::srgb(0.0, 0.8, 1.0);
const NEON_PINK: Color = Color::srgb(1.0, 0.2, 0.6);
const NEON_RED: Color = Color::srgb(1.0, 0.25, 0.25);
const TEXT_COLOR: Color = Color::srgb(0.9, 0.9, 0.9);

const BUTTON_IDLE: Color = Color::srgb(0.12, 0.12, 0.2);
const BUTTON_HOVER: Color = Color::srgb(0.18, 0.2, 0.35);
const BUTTON_PRESSED: Color = Color::srgb(0.0, 0.45, 0.6);

/// Entries listed on the leaderboard screen.
const LEADERBOARD_ROWS: usize = 10;

/// Registers the spawn/despawn systems for every menu screen plus the shared button handling.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Screen::Loading), spawn_loading_screen)
            .add_systems(OnEnter(Screen::Menu), spawn_menu)
            .add_systems(OnEnter(Screen::Pause), spawn_pause_menu)
            .add_systems(OnEnter(Screen::GameOver), spawn_game_over)
            .add_systems(OnEnter(Screen::Leaderboard), spawn_leaderboard)
            .add_systems(OnEnter(Screen::Settings), spawn_settings)
            .add_systems(OnExit(Screen::Settings), clear_settings_error)
            .add_systems(
                Update,
                (
                    finish_loading.run_if(in_state(Screen::Loading)),
                    handle_menu_actions,
                    tint_buttons,
                    (refresh_setting_values, refresh_error_banner)
                        .run_if(in_state(Screen::Settings)),
                )
                    .in_set(GameSet::Input),
            );

        for screen in Screen::ALL {
            if screen != Screen::Gameplay {
                app.add_systems(OnExit(screen), despawn_screen_roots);
            }
        }
    }
}

/// What a button does when pressed.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    StartGame,
    Resume,
    PlayAgain,
    OpenLeaderboard,
    OpenSettings,
    QuitToMenu,
    LeaderboardBack,
    SaveSettings,
    Quit,
    SoundDown,
    SoundUp,
    MusicDown,
    MusicUp,
    ToggleScreenShake,
    ToggleShowDamage,
    CycleDifficulty,
}

impl MenuAction {
    /// Screen this action navigates to, or `None` for actions that stay put.
    pub fn destination(self, manager: &ScreenManager) -> Option<Screen> {
        match self {
            MenuAction::StartGame | MenuAction::Resume | MenuAction::PlayAgain => {
                Some(Screen::Gameplay)
            }
            MenuAction::OpenLeaderboard => Some(Screen::Leaderboard),
            MenuAction::OpenSettings => Some(Screen::Settings),
            MenuAction::QuitToMenu => Some(Screen::Menu),
            MenuAction::LeaderboardBack => match manager.previous_state() {
                Some(back @ (Screen::Menu | Screen::GameOver)) => Some(back),
                _ => Some(Screen::Menu),
            },
            MenuAction::SaveSettings => match manager.previous_state() {
                Some(Screen::Pause) => Some(Screen::Pause),
                _ => Some(Screen::Menu),
            },
            MenuAction::Quit
            | MenuAction::SoundDown
            | MenuAction::SoundUp
            | MenuAction::MusicDown
            | MenuAction::MusicUp
            | MenuAction::ToggleScreenShake
            | MenuAction::ToggleShowDamage
            | MenuAction::CycleDifficulty => None,
        }
    }
}

/// One editable row on the settings screen.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    SoundVolume,
    MusicVolume,
    ScreenShake,
    ShowDamage,
    Difficulty,
}

impl SettingKind {
    pub fn label(self) -> &'static str {
        match self {
            SettingKind::SoundVolume => "Sound Volume",
            SettingKind::MusicVolume => "Music Volume",
            SettingKind::ScreenShake => "Screen Shake",
            SettingKind::ShowDamage => "Show Damage",
            SettingKind::Difficulty => "Difficulty",
        }
    }

    pub fn value_text(self, settings: &GameSettings) -> String {
        fn on_off(flag: bool) -> String {
            let word = if flag { "ON" } else { "OFF" };
            word.to_owned()
        }
        match self {
            SettingKind::SoundVolume => format!("{:.0}%", settings.sound_volume * 100.0),
            SettingKind::MusicVolume => format!("{:.0}%", settings.music_volume * 100.0),
            SettingKind::ScreenShake => on_off(settings.screen_shake),
            SettingKind::ShowDamage => on_off(settings.show_damage),
            SettingKind::Difficulty => settings.difficulty.label().to_owned(),
        }
    }

    fn buttons(self) -> &'static [(&'static str, MenuAction)] {
        match self {
            SettingKind::SoundVolume => &[("-", MenuAction::SoundDown), ("+", MenuAction::SoundUp)],
            SettingKind::MusicVolume => &[("-", MenuAction::MusicDown), ("+", MenuAction::MusicUp)],
            SettingKind::ScreenShake => &[("TOGGLE", MenuAction::ToggleScreenShake)],
            SettingKind::ShowDamage => &[("TOGGLE", MenuAction::ToggleShowDamage)],
            SettingKind::Difficulty => &[("CHANGE", MenuAction::CycleDifficulty)],
        }
    }
}

/// Root of whichever menu screen is showing.
#[derive(Component)]
struct ScreenRoot;

/// Text node showing the current value of a setting.
#[derive(Component)]
struct SettingValue(SettingKind);

#[derive(Component)]
struct ErrorBanner;

fn screen_root(background: Color) -> NodeBundle {
    NodeBundle {
        background_color: BackgroundColor(background),
        style: Style {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            row_gap: Val::Px(14.0),
            ..default()
        },
        ..default()
    }
}

fn text(value: impl Into<String>, font_size: f32, color: Color) -> TextBundle {
    TextBundle::from_section(
        value,
        TextStyle {
            font_size,
            color,
            ..default()
        },
    )
}

fn spawn_title(parent: &mut ChildBuilder, title: &str, color: Color) {
    parent.spawn(
        text(title, 56.0, color).with_style(Style {
            margin: UiRect::bottom(Val::Px(24.0)),
            ..default()
        }),
    );
}

fn spawn_button(parent: &mut ChildBuilder, label: &str, action: MenuAction, width: Val) {
    parent
        .spawn((
            action,
            ButtonBundle {
                style: Style {
                    width,
                    height: Val::Px(50.0),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    border: UiRect::all(Val::Px(2.0)),
                    ..default()
                },
                border_color: BorderColor(NEON_BLUE),
                background_color: BackgroundColor(BUTTON_IDLE),
                ..default()
            },
        ))
        .with_children(|button| {
            button.spawn(text(label, 24.0, TEXT_COLOR));
        });
}

fn spawn_menu_button(parent: &mut ChildBuilder, label: &str, action: MenuAction) {
    spawn_button(parent, label, action, Val::Px(240.0));
}

fn spawn_loading_screen(mut commands: Commands) {
    commands
        .spawn((ScreenRoot, Name::new("LoadingScreen"), screen_root(BG_COLOR)))
        .with_children(|parent| {
            parent.spawn(text("LOADING...", 36.0, TEXT_COLOR));
        });
}

fn spawn_menu(mut commands: Commands) {
    commands
        .spawn((ScreenRoot, Name::new("MainMenu"), screen_root(BG_COLOR)))
        .with_children(|parent| {
            spawn_title(parent, "CODEBREAK", NEON_BLUE);
            spawn_menu_button(parent, "START GAME", MenuAction::StartGame);
            spawn_menu_button(parent, "LEADERBOARD", MenuAction::OpenLeaderboard);
            spawn_menu_button(parent, "SETTINGS", MenuAction::OpenSettings);
            spawn_menu_button(parent, "QUIT", MenuAction::Quit);
        });
}

fn spawn_pause_menu(mut commands: Commands) {
    commands
        .spawn((
            ScreenRoot,
            Name::new("PauseMenu"),
            // The paused run's HUD stays underneath.
            NodeBundle {
                z_index: ZIndex::Global(10),
                ..screen_root(Color::srgba(0.0, 0.0, 0.0, 0.7))
            },
        ))
        .with_children(|parent| {
            spawn_title(parent, "PAUSED", NEON_PINK);
            spawn_menu_button(parent, "RESUME", MenuAction::Resume);
            spawn_menu_button(parent, "LEADERBOARD", MenuAction::OpenLeaderboard);
            spawn_menu_button(parent, "SETTINGS", MenuAction::OpenSettings);
            spawn_menu_button(parent, "QUIT TO MENU", MenuAction::QuitToMenu);
        });
}

fn spawn_game_over(mut commands: Commands, stats: Res<RunStats>) {
    commands
        .spawn((ScreenRoot, Name::new("GameOver"), screen_root(BG_COLOR)))
        .with_children(|parent| {
            spawn_title(parent, "GAME OVER", NEON_RED);
            parent.spawn(text(format!("Score: {}", stats.score()), 36.0, TEXT_COLOR));
            parent.spawn(
                text(
                    format!("Survived: {}s", stats.survival_secs()),
                    28.0,
                    TEXT_COLOR,
                )
                .with_style(Style {
                    margin: UiRect::bottom(Val::Px(24.0)),
                    ..default()
                }),
            );
            spawn_menu_button(parent, "PLAY AGAIN", MenuAction::PlayAgain);
            spawn_menu_button(parent, "LEADERBOARD", MenuAction::OpenLeaderboard);
            spawn_menu_button(parent, "QUIT TO MENU", MenuAction::QuitToMenu);
        });
}

fn spawn_leaderboard(mut commands: Commands, leaderboard: Res<Leaderboard>) {
    commands
        .spawn((ScreenRoot, Name::new("Leaderboard"), screen_root(BG_COLOR)))
        .with_children(|parent| {
            spawn_title(parent, "LEADERBOARD", NEON_BLUE);
            if leaderboard.is_empty() {
                parent.spawn(text("No runs yet", 28.0, TEXT_COLOR));
            }
            for (rank, entry) in leaderboard.top(LEADERBOARD_ROWS).iter().enumerate() {
                parent.spawn(text(
                    format!("{}. {}: {}", rank + 1, entry.name, entry.score),
                    28.0,
                    TEXT_COLOR,
                ));
            }
            spawn_button(parent, "BACK", MenuAction::LeaderboardBack, Val::Px(150.0));
        });
}

fn spawn_settings(mut commands: Commands, settings: Res<GameSettings>) {
    let rows = [
        SettingKind::SoundVolume,
        SettingKind::MusicVolume,
        SettingKind::ScreenShake,
        SettingKind::ShowDamage,
        SettingKind::Difficulty,
    ];

    commands
        .spawn((ScreenRoot, Name::new("Settings"), screen_root(BG_COLOR)))
        .with_children(|parent| {
            spawn_title(parent, "SETTINGS", NEON_BLUE);
            for kind in rows {
                parent
                    .spawn(NodeBundle {
                        style: Style {
                            width: Val::Px(560.0),
                            align_items: AlignItems::Center,
                            column_gap: Val::Px(12.0),
                            ..default()
                        },
                        ..default()
                    })
                    .with_children(|row| {
                        row.spawn(text(kind.label(), 24.0, TEXT_COLOR).with_style(Style {
                            width: Val::Px(220.0),
                            ..default()
                        }));
                        row.spawn((
                            SettingValue(kind),
                            text(kind.value_text(&settings), 24.0, NEON_BLUE).with_style(
                                Style {
                                    width: Val::Px(100.0),
                                    ..default()
                                },
                            ),
                        ));
                        for (label, action) in kind.buttons() {
                            spawn_button(row, label, *action, Val::Px(100.0));
                        }
                    });
            }
            parent.spawn((ErrorBanner, text("", 20.0, NEON_RED)));
            spawn_menu_button(parent, "SAVE & RETURN", MenuAction::SaveSettings);
        });
}

fn despawn_screen_roots(mut commands: Commands, query: Query<Entity, With<ScreenRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

fn clear_settings_error(mut manager: ResMut<ScreenManager>) {
    manager.clear_error();
}

/// Leaves the loading screen once every audio clip has settled. An unusable start screen label
/// falls back to the main menu.
fn finish_loading(
    asset_server: Res<AssetServer>,
    handles: Res<AudioHandles>,
    settings: Res<GameSettings>,
    mut manager: ResMut<ScreenManager>,
) {
    if manager.is_transitioning() || manager.current_state() != Screen::Loading {
        return;
    }
    if !handles.settled(&asset_server) {
        return;
    }

    let accepted = settings.start_screen != Screen::Loading.label()
        && manager.request(&settings.start_screen, true);
    if !accepted {
        manager.transition_to(Screen::Menu, true);
    }
}

fn handle_menu_actions(
    interactions: Query<(&Interaction, &MenuAction), (Changed<Interaction>, With<Button>)>,
    mut manager: ResMut<ScreenManager>,
    mut settings: ResMut<GameSettings>,
    settings_path: Res<SettingsPath>,
    mut menu_select: EventWriter<MenuSelect>,
    mut app_exit: EventWriter<AppExit>,
) {
    for (interaction, action) in &interactions {
        if *interaction != Interaction::Pressed {
            continue;
        }
        menu_select.send(MenuSelect);

        match action {
            MenuAction::Quit => {
                info!("Quit requested from menu");
                app_exit.send(AppExit::Success);
            }
            MenuAction::SoundDown => settings.adjust_sound_volume(-VOLUME_STEP),
            MenuAction::SoundUp => settings.adjust_sound_volume(VOLUME_STEP),
            MenuAction::MusicDown => settings.adjust_music_volume(-VOLUME_STEP),
            MenuAction::MusicUp => settings.adjust_music_volume(VOLUME_STEP),
            MenuAction::ToggleScreenShake => settings.screen_shake = !settings.screen_shake,
            MenuAction::ToggleShowDamage => settings.show_damage = !settings.show_damage,
            MenuAction::CycleDifficulty => settings.difficulty = settings.difficulty.next(),
            MenuAction::SaveSettings => match settings.save(&settings_path.0) {
                Ok(()) => {
                    info!("Settings saved to {}", settings_path.0.display());
                    manager.clear_error();
                    if let Some(target) = action.destination(&manager) {
                        manager.transition_to(target, true);
                    }
                }
                Err(e) => {
                    error!("Saving settings failed: {e:#}");
                    manager.set_error(format!("Could not save settings: {e}"));
                }
            },
            other => {
                if let Some(target) = other.destination(&manager) {
                    manager.transition_to(target, true);
                }
            }
        }
    }
}

fn tint_buttons(
    mut buttons: Query<(&Interaction, &mut BackgroundColor), (Changed<Interaction>, With<Button>)>,
) {
    for (interaction, mut background) in &mut buttons {
        background.0 = match interaction {
            Interaction::Pressed => BUTTON_PRESSED,
            Interaction::Hovered => BUTTON_HOVER,
            Interaction::None => BUTTON_IDLE,
        };
    }
}

fn refresh_setting_values(
    settings: Res<GameSettings>,
    mut values: Query<(&SettingValue, &mut Text)>,
) {
    if !settings.is_changed() {
        return;
    }
    for (value, mut text) in &mut values {
        text.sections[0].value = value.0.value_text(&settings);
    }
}

fn refresh_error_banner(
    manager: Res<ScreenManager>,
    mut banners: Query<&mut Text, With<ErrorBanner>>,
) {
    let message = manager.error().unwrap_or_default();
    for mut text in &mut banners {
        if text.sections[0].value != message {
            text.sections[0].value = message.to_owned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_via(path: &[Screen]) -> ScreenManager {
        let mut manager = ScreenManager::new(path[0], 15);
        for screen in &path[1..] {
            manager.transition_to(*screen, false);
        }
        manager
    }

    #[test]
    fn navigation_targets() {
        let manager = ScreenManager::default();
        assert_eq!(
            MenuAction::StartGame.destination(&manager),
            Some(Screen::Gameplay)
        );
        assert_eq!(
            MenuAction::Resume.destination(&manager),
            Some(Screen::Gameplay)
        );
        assert_eq!(
            MenuAction::OpenLeaderboard.destination(&manager),
            Some(Screen::Leaderboard)
        );
        assert_eq!(
            MenuAction::QuitToMenu.destination(&manager),
            Some(Screen::Menu)
        );
        assert_eq!(MenuAction::Quit.destination(&manager), None);
        assert_eq!(MenuAction::SoundUp.destination(&manager), None);
    }

    #[test]
    fn leaderboard_back_returns_to_menu_or_game_over() {
        let from_game_over = manager_via(&[Screen::GameOver, Screen::Leaderboard]);
        assert_eq!(
            MenuAction::LeaderboardBack.destination(&from_game_over),
            Some(Screen::GameOver)
        );
        let from_menu = manager_via(&[Screen::Menu, Screen::Leaderboard]);
        assert_eq!(
            MenuAction::LeaderboardBack.destination(&from_menu),
            Some(Screen::Menu)
        );
        let from_pause = manager_via(&[Screen::Pause, Screen::Leaderboard]);
        assert_eq!(
            MenuAction::LeaderboardBack.destination(&from_pause),
            Some(Screen::Menu)
        );
    }

    #[test]
    fn save_returns_to_pause_when_opened_from_pause() {
        let from_pause = manager_via(&[Screen::Pause, Screen::Settings]);
        assert_eq!(
            MenuAction::SaveSettings.destination(&from_pause),
            Some(Screen::Pause)
        );
        let from_menu = manager_via(&[Screen::Menu, Screen::Settings]);
        assert_eq!(
            MenuAction::SaveSettings.destination(&from_menu),
            Some(Screen::Menu)
        );
    }

    #[test]
    fn setting_values_render() {
        let settings = GameSettings {
            sound_volume: 0.7,
            screen_shake: false,
            ..default()
        };
        assert_eq!(SettingKind::SoundVolume.value_text(&settings), "70%");
        assert_eq!(SettingKind::ScreenShake.value_text(&settings), "OFF");
        assert_eq!(SettingKind::ShowDamage.value_text(&settings), "ON");
        assert_eq!(SettingKind::Difficulty.value_text(&settings), "Normal");
    }

    fn action_app(path: std::path::PathBuf, manager: ScreenManager) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<MenuSelect>()
            .add_event::<AppExit>()
            .insert_resource(GameSettings::default())
            .insert_resource(SettingsPath(path))
            .insert_resource(manager)
            .add_systems(Update, handle_menu_actions);
        app
    }

    fn loading_app(start_screen: &str, manager: ScreenManager) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_resource::<AudioHandles>()
            .insert_resource(GameSettings {
                start_screen: start_screen.to_owned(),
                ..default()
            })
            .insert_resource(manager)
            .add_systems(Update, finish_loading);
        app.update();
        app
    }

    #[test]
    fn loading_fades_to_configured_start_screen() {
        let app = loading_app("leaderboard", ScreenManager::new(Screen::Loading, 3));
        let manager = app.world().resource::<ScreenManager>();
        assert_eq!(manager.current_state(), Screen::Loading);
        assert_eq!(manager.next_state(), Some(Screen::Leaderboard));
    }

    #[test]
    fn loading_falls_back_to_menu() {
        for label in ["credits", "loading"] {
            let app = loading_app(label, ScreenManager::new(Screen::Loading, 3));
            assert_eq!(
                app.world().resource::<ScreenManager>().next_state(),
                Some(Screen::Menu),
                "start screen {label:?}"
            );
        }
    }

    #[test]
    fn loading_waits_for_running_fade() {
        let mut manager = ScreenManager::new(Screen::Loading, 3);
        manager.transition_to(Screen::Settings, true);
        let app = loading_app("leaderboard", manager);
        assert_eq!(
            app.world().resource::<ScreenManager>().next_state(),
            Some(Screen::Settings)
        );
    }

    #[test]
    fn loading_ignored_once_screen_has_changed() {
        let app = loading_app("leaderboard", ScreenManager::new(Screen::Menu, 3));
        let manager = app.world().resource::<ScreenManager>();
        assert!(!manager.is_transitioning());
        assert_eq!(manager.current_state(), Screen::Menu);
    }

    fn press(app: &mut App, action: MenuAction) {
        app.world_mut()
            .spawn((Button, Interaction::Pressed, action));
        app.update();
    }

    #[test]
    fn pressing_buttons_edits_settings() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut app = action_app(dir.path().join("s.json"), ScreenManager::default());
        press(&mut app, MenuAction::ToggleShowDamage);
        press(&mut app, MenuAction::CycleDifficulty);
        let settings = app.world().resource::<GameSettings>();
        assert!(!settings.show_damage);
        assert_eq!(settings.difficulty, crate::settings::Difficulty::Hard);
        assert_eq!(
            app.world().resource::<ScreenManager>().current_state(),
            Screen::Menu
        );
    }

    #[test]
    fn successful_save_writes_file_and_fades_back() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("s.json");
        let manager = manager_via(&[Screen::Pause, Screen::Settings]);
        let mut app = action_app(path.clone(), manager);
        press(&mut app, MenuAction::SaveSettings);

        assert!(path.exists());
        let manager = app.world().resource::<ScreenManager>();
        assert_eq!(manager.next_state(), Some(Screen::Pause));
        assert_eq!(manager.error(), None);
    }

    #[test]
    fn failed_save_stays_and_reports() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("missing").join("s.json");
        let manager = manager_via(&[Screen::Menu, Screen::Settings]);
        let mut app = action_app(path, manager);
        press(&mut app, MenuAction::SaveSettings);

        let manager = app.world().resource::<ScreenManager>();
        assert!(!manager.is_transitioning());
        assert_eq!(manager.current_state(), Screen::Settings);
        assert!(manager.error().is_some());
    }
}
