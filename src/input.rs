use bevy::input::InputSystem;
use bevy::prelude::*;
use bevy::window::WindowCloseRequested;

#[derive(Resource)]
pub struct Keybinds {
    pub up: KeyCode,
    pub down: KeyCode,
    pub fire: KeyCode,
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            up: KeyCode::ArrowUp,
            down: KeyCode::ArrowDown,
            fire: KeyCode::Space,
        }
    }
}

/// A fire press seen by a frame but not yet consumed by a tick.
///
/// `just_pressed` only lives for one frame while the fixed tick may run zero
/// or several times per frame, so presses are latched here in `PreUpdate`.
#[derive(Resource, Default, Debug)]
pub struct PendingFire(pub bool);

impl PendingFire {
    pub fn latch(&mut self, keys: &ButtonInput<KeyCode>, keybinds: &Keybinds) {
        if keys.just_pressed(keybinds.fire) {
            self.0 = true;
        }
    }
}

/// Input for one simulation tick: held movement keys and at most one press
/// of fire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

impl TickInput {
    /// Consumes the pending fire press, so a held key fires only once.
    pub fn sample(
        keys: &ButtonInput<KeyCode>,
        keybinds: &Keybinds,
        pending: &mut PendingFire,
    ) -> Self {
        Self {
            up: keys.pressed(keybinds.up),
            down: keys.pressed(keybinds.down),
            fire: std::mem::take(&mut pending.0),
        }
    }
}

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Keybinds>()
            .init_resource::<PendingFire>()
            .add_systems(PreUpdate, (latch_fire.after(InputSystem), quit_on_close));
    }
}

fn latch_fire(
    keys: Res<ButtonInput<KeyCode>>,
    keybinds: Res<Keybinds>,
    mut pending: ResMut<PendingFire>,
) {
    pending.latch(&keys, &keybinds);
}

fn quit_on_close(
    mut ev_close: EventReader<WindowCloseRequested>,
    mut ev_exit: EventWriter<AppExit>,
) {
    if ev_close.read().next().is_some() {
        info!("window closed, exiting");
        ev_exit.send(AppExit::Success);
    }
}
