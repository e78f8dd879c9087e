//! Image and font loading. Everything is resolved once at startup and held
//! in [`GameAssets`] / [`FontBytes`] for the life of the app; a missing or
//! unreadable file stops the app with a non-zero exit code.

use std::path::{Path, PathBuf};

use bevy::asset::io::file::FileAssetReader;
use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy::winit::WinitWindows;
use thiserror::Error;

pub const BALLOON_IMAGE: &str = "images/balloon.png";
pub const BOW_IMAGE: &str = "images/bow.png";
pub const ARROW_IMAGE: &str = "images/arrow.png";
pub const FONT: &str = "fonts/DejaVuSans-Bold.ttf";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {}", path.display())]
    Missing { path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bad window icon {}: {reason}", path.display())]
    Icon { path: PathBuf, reason: String },
}

#[derive(Resource)]
pub struct GameAssets {
    pub balloon: Handle<Image>,
    pub bow: Handle<Image>,
    pub arrow: Handle<Image>,
}

/// Raw font file, installed into the UI once its context exists.
#[derive(Resource)]
pub struct FontBytes(pub Vec<u8>);

/// Root the asset server resolves relative paths against.
pub fn asset_root() -> PathBuf {
    FileAssetReader::get_base_path().join("assets")
}

/// Checks every file the game needs is present under `root` and returns the
/// font contents.
pub fn verify(root: &Path) -> Result<Vec<u8>, AssetError> {
    for rel in [BALLOON_IMAGE, BOW_IMAGE, ARROW_IMAGE, FONT] {
        let path = root.join(rel);
        if !path.is_file() {
            return Err(AssetError::Missing { path });
        }
    }
    let path = root.join(FONT);
    std::fs::read(&path).map_err(|source| AssetError::Read { path, source })
}

fn decode_icon(path: &Path) -> Result<winit::window::Icon, AssetError> {
    let icon_err = |reason: String| AssetError::Icon {
        path: path.to_path_buf(),
        reason,
    };
    let image = image::open(path)
        .map_err(|e| icon_err(e.to_string()))?
        .into_rgba8();
    let (width, height) = image.dimensions();
    winit::window::Icon::from_rgba(image.into_raw(), width, height)
        .map_err(|e| icon_err(e.to_string()))
}

pub struct AssetsPlugin;
impl Plugin for AssetsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_assets).add_systems(
            Update,
            (
                watch_load_failures.run_if(resource_exists::<GameAssets>),
                set_window_icon,
            ),
        );
    }
}

fn load_assets(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut ev_exit: EventWriter<AppExit>,
) {
    let root = asset_root();
    let font = match verify(&root) {
        Ok(font) => font,
        Err(err) => {
            error!("{err}");
            ev_exit.send(AppExit::error());
            return;
        }
    };
    info!("assets found in {}", root.display());

    commands.insert_resource(FontBytes(font));
    commands.insert_resource(GameAssets {
        balloon: asset_server.load(BALLOON_IMAGE),
        bow: asset_server.load(BOW_IMAGE),
        arrow: asset_server.load(ARROW_IMAGE),
    });
}

fn watch_load_failures(
    assets: Res<GameAssets>,
    asset_server: Res<AssetServer>,
    mut ev_exit: EventWriter<AppExit>,
    mut reported: Local<bool>,
) {
    if *reported {
        return;
    }
    for handle in [&assets.balloon, &assets.bow, &assets.arrow] {
        if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle) {
            error!("failed to load sprite: {err}");
            ev_exit.send(AppExit::error());
            *reported = true;
            return;
        }
    }
}

/// The winit window only exists once the event loop has resumed, so this
/// keeps polling until it can apply the icon.
fn set_window_icon(
    winit_windows: NonSend<WinitWindows>,
    primary: Query<Entity, With<PrimaryWindow>>,
    mut done: Local<bool>,
) {
    if *done {
        return;
    }
    let Ok(entity) = primary.get_single() else {
        return;
    };
    let Some(window) = winit_windows.get_window(entity) else {
        return;
    };
    *done = true;

    match decode_icon(&asset_root().join(BALLOON_IMAGE)) {
        Ok(icon) => window.set_window_icon(Some(icon)),
        Err(err) => warn!("{err}"),
    }
}
