use std::ops::RangeInclusive;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::assets::GameAssets;
use crate::collision::Hitbox;
use crate::entities::{
    Arrow, Balloon, BalloonMotion, Bow, MAX_Y, SCREEN_HEIGHT, SCREEN_WIDTH, SPRITE_SIZE,
};
use crate::input::{Keybinds, PendingFire, TickInput};

#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Playing,
    GameOver,
}

/// Game-over latch of the pure model. [`AppState`] follows it through
/// [`BalloonPopped`] and never drives it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameStatus {
    Playing,
    GameOver,
}

#[derive(Resource)]
pub struct GameRng(pub StdRng);

#[derive(Event)]
pub struct BalloonPopped {
    pub shots: u32,
}

/// Tunables for one session. Speeds are pixels per tick.
#[derive(Resource, Clone, Debug)]
pub struct GameSettings {
    pub tick_hz: f64,
    pub balloon_motion: BalloonMotion,
    pub balloon_speed: f32,
    pub jitter_step: f32,
    /// Ticks between balloon direction changes, re-rolled after every change.
    pub turn_ticks: RangeInclusive<u32>,
    pub bow_speed: f32,
    pub arrow_speed: f32,
    pub seed: Option<u64>,
    pub score_pos: Vec2,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            balloon_motion: BalloonMotion::default(),
            balloon_speed: 2.0,
            jitter_step: 0.5,
            turn_ticks: 5..=60,
            bow_speed: 4.0,
            arrow_speed: 40.0,
            seed: None,
            score_pos: Vec2::new(740.0, 0.0),
        }
    }
}

/// What happened during a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub fired: bool,
    pub popped: bool,
}

/// Authoritative session state. Sprites only mirror it.
#[derive(Resource, Clone, Debug)]
pub struct Game {
    pub balloon: Balloon,
    pub bow: Bow,
    pub arrow: Arrow,
    /// Counts every shot taken, hit or miss.
    pub missed_shots: u32,
    pub status: GameStatus,
    pub motion: BalloonMotion,
    pub steps: u32,
    pub turn_after: u32,
}

impl Game {
    pub fn new(settings: &GameSettings, rng: &mut impl Rng) -> Self {
        let balloon = match settings.balloon_motion {
            BalloonMotion::Drift => Balloon::new(SCREEN_HEIGHT / 2.0, settings.balloon_speed),
            BalloonMotion::Jitter => Balloon::new(rng.gen_range(0..=MAX_Y as u32) as f32, 0.0),
        };
        Self {
            balloon,
            bow: Bow::new(settings.bow_speed),
            arrow: Arrow::new(settings.arrow_speed),
            missed_shots: 0,
            status: GameStatus::Playing,
            motion: settings.balloon_motion,
            steps: 0,
            turn_after: rng.gen_range(settings.turn_ticks.clone()),
        }
    }

    pub fn tick(
        &mut self,
        input: TickInput,
        settings: &GameSettings,
        rng: &mut impl Rng,
    ) -> TickReport {
        let mut report = TickReport::default();
        if self.status == GameStatus::GameOver {
            return report;
        }

        match self.motion {
            BalloonMotion::Drift => {
                self.steps += 1;
                if self.steps >= self.turn_after {
                    self.balloon.reverse();
                    self.steps = 0;
                    self.turn_after = rng.gen_range(settings.turn_ticks.clone());
                }
                self.balloon.drift();
            }
            BalloonMotion::Jitter => self.balloon.jitter(settings.jitter_step, rng),
        }

        if input.up {
            self.bow.move_up();
        }
        if input.down {
            self.bow.move_down();
        }

        if input.fire && self.arrow.fire(&self.bow) {
            self.missed_shots += 1;
            report.fired = true;
        } else {
            self.arrow.advance();
        }

        report.popped = self.check_collision();
        report
    }

    /// Latches game over when the arrow overlaps the balloon.
    pub fn check_collision(&mut self) -> bool {
        let hit = Hitbox::sprite(self.balloon.pos).intersects(&Hitbox::sprite(self.arrow.pos));
        if hit {
            self.status = GameStatus::GameOver;
        }
        hit
    }

    pub fn position_of(&self, actor: Actor) -> Vec2 {
        match actor {
            Actor::Balloon => self.balloon.pos,
            Actor::Bow => self.bow.pos,
            Actor::Arrow => self.arrow.pos,
        }
    }
}

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Actor {
    Balloon,
    Bow,
    Arrow,
}

/// Window pixel coordinates of a sprite's top-left corner to the centred,
/// y-up world position of its centre.
pub fn to_world(top_left: Vec2) -> Vec2 {
    Vec2::new(
        top_left.x + SPRITE_SIZE / 2.0 - SCREEN_WIDTH / 2.0,
        SCREEN_HEIGHT / 2.0 - top_left.y - SPRITE_SIZE / 2.0,
    )
}

pub struct SimPlugin;
impl Plugin for SimPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameSettings>()
            .add_event::<BalloonPopped>()
            .add_systems(Startup, (start_session, spawn_actors).chain())
            .add_systems(
                FixedUpdate,
                tick_game
                    .run_if(resource_exists::<Game>)
                    .run_if(in_state(AppState::Playing)),
            )
            .add_systems(
                Update,
                (enter_game_over, sync_actors.run_if(resource_exists::<Game>)),
            )
            .add_systems(OnEnter(AppState::GameOver), hide_actors);
    }
}

fn start_session(mut commands: Commands, settings: Res<GameSettings>) {
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let game = Game::new(&settings, &mut rng);
    info!(
        "balloon launched at y={} ({:?}), bow at y={}",
        game.balloon.pos.y, game.motion, game.bow.pos.y
    );
    commands.insert_resource(game);
    commands.insert_resource(GameRng(rng));
}

fn spawn_actors(mut commands: Commands, game: Res<Game>, assets: Option<Res<GameAssets>>) {
    let Some(assets) = assets else {
        return;
    };
    let actors = [
        (Actor::Balloon, assets.balloon.clone(), 1.0),
        (Actor::Bow, assets.bow.clone(), 2.0),
        (Actor::Arrow, assets.arrow.clone(), 3.0),
    ];
    for (actor, texture, z) in actors {
        commands.spawn((
            actor,
            SpriteBundle {
                texture,
                sprite: Sprite {
                    custom_size: Some(Vec2::splat(SPRITE_SIZE)),
                    ..default()
                },
                transform: Transform::from_translation(
                    to_world(game.position_of(actor)).extend(z),
                ),
                ..default()
            },
        ));
    }
}

fn tick_game(
    mut game: ResMut<Game>,
    settings: Res<GameSettings>,
    keys: Res<ButtonInput<KeyCode>>,
    keybinds: Res<Keybinds>,
    mut pending: ResMut<PendingFire>,
    mut rng: ResMut<GameRng>,
    mut ev_popped: EventWriter<BalloonPopped>,
) {
    let input = TickInput::sample(&keys, &keybinds, &mut pending);
    let report = game.tick(input, &settings, &mut rng.0);
    if report.fired {
        debug!("arrow away from y={}, shots={}", game.bow.pos.y, game.missed_shots);
    }
    if report.popped {
        ev_popped.send(BalloonPopped {
            shots: game.missed_shots,
        });
    }
}

fn enter_game_over(
    mut ev_popped: EventReader<BalloonPopped>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for ev in ev_popped.read() {
        info!("balloon popped after {} shots", ev.shots);
        next_state.set(AppState::GameOver);
    }
}

fn sync_actors(game: Res<Game>, mut q: Query<(&Actor, &mut Transform)>) {
    if !game.is_changed() {
        return;
    }
    for (actor, mut t) in &mut q {
        let z = t.translation.z;
        t.translation = to_world(game.position_of(*actor)).extend(z);
    }
}

fn hide_actors(mut q: Query<&mut Visibility, With<Actor>>) {
    for mut visibility in &mut q {
        *visibility = Visibility::Hidden;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ArrowState, ARROW_SENTINEL};
    use bevy::state::app::StatesPlugin;

    const IDLE: TickInput = TickInput {
        up: false,
        down: false,
        fire: false,
    };
    const FIRE: TickInput = TickInput {
        up: false,
        down: false,
        fire: true,
    };
    const UP: TickInput = TickInput {
        up: true,
        down: false,
        fire: false,
    };

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn new_game(rng: &mut StdRng) -> Game {
        Game::new(&GameSettings::default(), rng)
    }

    #[test]
    fn new_game_layout() {
        let mut rng = seeded_rng();
        let game = new_game(&mut rng);
        assert_eq!(game.balloon.pos, Vec2::new(0.0, 250.0));
        assert_eq!(game.bow.pos, Vec2::new(936.0, 218.0));
        assert_eq!(game.arrow.pos, ARROW_SENTINEL);
        assert_eq!(game.arrow.state, ArrowState::Ready);
        assert_eq!(game.missed_shots, 0);
        assert_eq!(game.status, GameStatus::Playing);
        assert!((5..=60).contains(&game.turn_after));
    }

    #[test]
    fn jitter_session_spawns_inside_window() {
        let settings = GameSettings {
            balloon_motion: BalloonMotion::Jitter,
            ..default()
        };
        let mut rng = seeded_rng();
        for _ in 0..100 {
            let game = Game::new(&settings, &mut rng);
            assert!((0.0..=MAX_Y).contains(&game.balloon.pos.y));
            assert_eq!(game.balloon.pos.y.fract(), 0.0);
        }
    }

    #[test]
    fn firing_counts_a_shot_and_nocks_the_arrow() {
        let mut rng = seeded_rng();
        let settings = GameSettings::default();
        let mut game = new_game(&mut rng);

        let report = game.tick(FIRE, &settings, &mut rng);

        assert!(report.fired);
        assert_eq!(game.missed_shots, 1);
        assert_eq!(game.arrow.state, ArrowState::Fire);
        assert_eq!(game.arrow.pos, Vec2::new(872.0, 218.0));
    }

    #[test]
    fn holding_fire_while_flying_does_nothing() {
        let mut rng = seeded_rng();
        let settings = GameSettings::default();
        let mut game = new_game(&mut rng);
        game.tick(FIRE, &settings, &mut rng);
        let report = game.tick(FIRE, &settings, &mut rng);
        assert!(!report.fired);
        assert_eq!(game.missed_shots, 1);
        assert_eq!(game.arrow.pos.x, 832.0);
    }

    #[test]
    fn arrow_returns_to_ready_after_22_ticks() {
        let mut arrow = Arrow::new(40.0);
        assert!(arrow.fire(&Bow::new(4.0)));
        assert_eq!(arrow.pos.x, 872.0);
        for _ in 0..21 {
            arrow.advance();
            assert_eq!(arrow.state, ArrowState::Fire);
        }
        assert_eq!(arrow.pos.x, 32.0);
        arrow.advance();
        assert_eq!(arrow.state, ArrowState::Ready);
        assert_eq!(arrow.pos, ARROW_SENTINEL);
    }

    #[test]
    fn missed_arrow_can_be_fired_again() {
        let mut rng = seeded_rng();
        let settings = GameSettings::default();
        let mut game = new_game(&mut rng);
        // Keep the balloon out of the arrow's lane.
        game.balloon = Balloon::new(0.0, 0.0);

        game.tick(FIRE, &settings, &mut rng);
        for _ in 0..22 {
            game.tick(IDLE, &settings, &mut rng);
        }
        assert_eq!(game.arrow.state, ArrowState::Ready);
        assert_eq!(game.status, GameStatus::Playing);

        game.tick(FIRE, &settings, &mut rng);
        assert_eq!(game.missed_shots, 2);
        assert_eq!(game.arrow.state, ArrowState::Fire);
    }

    #[test]
    fn overlap_ends_the_game_and_freezes_everything() {
        let mut rng = seeded_rng();
        let settings = GameSettings::default();
        let mut game = new_game(&mut rng);
        game.balloon.pos = Vec2::new(100.0, 100.0);
        game.arrow.pos = Vec2::new(100.0, 100.0);
        game.arrow.state = ArrowState::Fire;

        assert!(game.check_collision());
        assert_eq!(game.status, GameStatus::GameOver);

        let before = game.clone();
        for _ in 0..10 {
            let report = game.tick(UP, &settings, &mut rng);
            assert_eq!(report, TickReport::default());
        }
        assert_eq!(game.bow.pos, before.bow.pos);
        assert_eq!(game.balloon.pos, before.balloon.pos);
        assert_eq!(game.arrow.pos, before.arrow.pos);
        assert_eq!(game.steps, before.steps);
    }

    #[test]
    fn arrow_in_balloon_lane_pops_it() {
        let mut rng = seeded_rng();
        let settings = GameSettings::default();
        let mut game = new_game(&mut rng);
        game.balloon = Balloon::new(game.bow.pos.y, 0.0);

        game.tick(FIRE, &settings, &mut rng);
        let mut popped = false;
        for _ in 0..30 {
            popped |= game.tick(IDLE, &settings, &mut rng).popped;
        }
        assert!(popped);
        assert_eq!(game.status, GameStatus::GameOver);
        assert_eq!(game.missed_shots, 1);
    }

    #[test]
    fn balloon_turns_after_threshold() {
        let mut rng = seeded_rng();
        let settings = GameSettings::default();
        let mut game = new_game(&mut rng);
        let vel = game.balloon.vel;
        let turn_after = game.turn_after;
        for _ in 1..turn_after {
            game.tick(IDLE, &settings, &mut rng);
        }
        assert_eq!(game.balloon.vel, vel);
        game.tick(IDLE, &settings, &mut rng);
        assert_eq!(game.balloon.vel, -vel);
        assert_eq!(game.steps, 0);
        assert!((5..=60).contains(&game.turn_after));
    }

    #[test]
    fn positions_stay_in_bounds_for_any_inputs() {
        let mut rng = seeded_rng();
        for motion in [BalloonMotion::Drift, BalloonMotion::Jitter] {
            let settings = GameSettings {
                balloon_motion: motion,
                balloon_speed: 7.0,
                bow_speed: 9.0,
                ..default()
            };
            let mut game = Game::new(&settings, &mut rng);
            for _ in 0..10_000 {
                let input = TickInput {
                    up: rng.gen_bool(0.5),
                    down: rng.gen_bool(0.3),
                    fire: false,
                };
                game.tick(input, &settings, &mut rng);
                assert!((0.0..=MAX_Y).contains(&game.balloon.pos.y));
                assert!((0.0..=MAX_Y).contains(&game.bow.pos.y));
                assert_eq!(game.bow.pos.x, 936.0);
                assert_eq!(game.balloon.pos.x, 0.0);
            }
        }
    }

    #[test]
    fn world_mapping_centres_sprites() {
        assert_eq!(to_world(Vec2::ZERO), Vec2::new(-468.0, 218.0));
        assert_eq!(to_world(Vec2::new(936.0, 436.0)), Vec2::new(468.0, -218.0));
    }

    #[test]
    fn held_fire_key_shoots_once_per_press() {
        let mut rng = seeded_rng();
        let settings = GameSettings::default();
        let mut game = new_game(&mut rng);
        game.balloon = Balloon::new(0.0, 0.0);

        let keybinds = Keybinds::default();
        let mut pending = PendingFire::default();
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(keybinds.fire);
        for _ in 0..30 {
            pending.latch(&keys, &keybinds);
            let input = TickInput::sample(&keys, &keybinds, &mut pending);
            game.tick(input, &settings, &mut rng);
            keys.clear();
        }

        assert_eq!(game.missed_shots, 1);
        assert_eq!(game.arrow.state, ArrowState::Ready);
        assert_eq!(game.status, GameStatus::Playing);
    }

    fn headless_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<AppState>()
            .insert_resource(GameSettings {
                seed: Some(7),
                ..default()
            })
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<Keybinds>()
            .init_resource::<PendingFire>()
            .add_plugins(SimPlugin);
        app
    }

    #[test]
    fn popped_balloon_ends_the_session() {
        let mut app = headless_app();
        app.update();
        for actor in [Actor::Balloon, Actor::Bow, Actor::Arrow] {
            app.world_mut()
                .spawn((actor, Transform::default(), Visibility::Visible));
        }

        let steps = app.world().resource::<Game>().steps;
        app.world_mut().run_schedule(FixedUpdate);
        assert_ne!(app.world().resource::<Game>().steps, steps);

        app.world_mut().send_event(BalloonPopped { shots: 1 });
        app.update();
        app.update();

        assert_eq!(
            *app.world().resource::<State<AppState>>().get(),
            AppState::GameOver
        );
        let mut q = app
            .world_mut()
            .query_filtered::<&Visibility, With<Actor>>();
        let hidden: Vec<bool> = q
            .iter(app.world())
            .map(|v| *v == Visibility::Hidden)
            .collect();
        assert_eq!(hidden, vec![true; 3]);

        // The model itself never collided, so only the state gate stops it.
        let before = app.world().resource::<Game>().clone();
        assert_eq!(before.status, GameStatus::Playing);
        for _ in 0..5 {
            app.world_mut().run_schedule(FixedUpdate);
        }
        let after = app.world().resource::<Game>();
        assert_eq!(after.steps, before.steps);
        assert_eq!(after.balloon.pos, before.balloon.pos);
        assert_eq!(after.bow.pos, before.bow.pos);
        assert_eq!(after.arrow.pos, before.arrow.pos);
    }
}
