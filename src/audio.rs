//! Audio preloading and playback. Stashes Bevy `Handle<AudioSource>` references so the clips stay
//! in memory, plays the menu click on request and keeps the looping music at the configured volume.
//!
//! Missing files are not fatal: the asset server logs the failed load and playback becomes a no-op.

use bevy::asset::LoadState;
use bevy::audio::{AudioSinkPlayback, Volume};
use bevy::prelude::*;

use crate::screen::Screen;
use crate::settings::GameSettings;

/// Registers audio loading, the click event and music volume tracking.
pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AudioHandles>()
            .add_event::<MenuSelect>()
            .add_systems(OnEnter(Screen::Loading), load_audio_handles)
            .add_systems(OnExit(Screen::Loading), start_music)
            .add_systems(Update, (play_menu_select, apply_music_volume));
    }
}

/// Handles to game-wide clips. Each `Handle` is a cheap pointer into Bevy's asset storage.
#[derive(Resource, Default)]
pub struct AudioHandles {
    pub menu_select: Option<Handle<AudioSource>>,
    pub music: Option<Handle<AudioSource>>,
}

impl AudioHandles {
    /// True once every queued clip has either loaded or failed.
    pub fn settled(&self, asset_server: &AssetServer) -> bool {
        [&self.menu_select, &self.music]
            .into_iter()
            .flatten()
            .all(|handle| {
                !matches!(
                    asset_server.get_load_state(handle.id()),
                    Some(LoadState::NotLoaded | LoadState::Loading)
                )
            })
    }
}

/// Sent by the UI whenever a button is pressed.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct MenuSelect;

#[derive(Component)]
struct BackgroundMusic;

fn load_audio_handles(asset_server: Res<AssetServer>, mut handles: ResMut<AudioHandles>) {
    if handles.menu_select.is_some() {
        return;
    }
    handles.menu_select = Some(asset_server.load("audio/menu_select.ogg"));
    handles.music = Some(asset_server.load("audio/music.ogg"));

    info!("Queued audio clips from assets/audio/.");
}

fn start_music(
    mut commands: Commands,
    handles: Res<AudioHandles>,
    settings: Res<GameSettings>,
    existing: Query<(), With<BackgroundMusic>>,
) {
    let Some(music) = handles.music.clone() else {
        return;
    };
    if !existing.is_empty() {
        return;
    }
    commands.spawn((
        BackgroundMusic,
        Name::new("BackgroundMusic"),
        AudioBundle {
            source: music,
            settings: PlaybackSettings::LOOP.with_volume(Volume::new(settings.music_volume)),
        },
    ));
}

fn play_menu_select(
    mut commands: Commands,
    mut events: EventReader<MenuSelect>,
    handles: Res<AudioHandles>,
    settings: Res<GameSettings>,
) {
    if events.read().count() == 0 {
        return;
    }
    let Some(clip) = handles.menu_select.clone() else {
        return;
    };
    commands.spawn(AudioBundle {
        source: clip,
        settings: PlaybackSettings::DESPAWN.with_volume(Volume::new(settings.sound_volume)),
    });
}

fn apply_music_volume(
    settings: Res<GameSettings>,
    sinks: Query<&AudioSink, With<BackgroundMusic>>,
) {
    if !settings.is_changed() {
        return;
    }
    for sink in &sinks {
        sink.set_volume(settings.music_volume);
    }
}
