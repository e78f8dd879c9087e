mod assets;
mod collision;
mod entities;
mod input;
mod sim;
mod ui;

use assets::AssetsPlugin;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy::window::WindowResolution;
use entities::{SCREEN_HEIGHT, SCREEN_WIDTH};
use input::InputPlugin;
use sim::{AppState, GameSettings, SimPlugin};
use ui::UiPlugin;

fn main() -> AppExit {
    let settings = GameSettings::default();

    App::new()
        .insert_resource(ClearColor(Color::WHITE))
        .insert_resource(Time::<Fixed>::from_hz(settings.tick_hz))
        .insert_resource(settings)
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Balloon game".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        resizable: false,
                        ..default()
                    }),
                    close_when_requested: false,
                    ..default()
                })
                .set(LogPlugin {
                    filter: "wgpu=error,naga=warn,balloon_game=info".into(),
                    level: Level::INFO,
                    ..default()
                }),
        )
        .init_state::<AppState>()
        .add_plugins((AssetsPlugin, SimPlugin, InputPlugin, UiPlugin))
        .add_systems(Startup, setup_camera)
        .run()
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}
