use bevy::prelude::*;
use bevy_egui::{
    egui::{self, Align2, Color32, FontData, FontDefinitions, FontFamily, FontId, RichText},
    EguiContexts, EguiPlugin,
};

use crate::assets::FontBytes;
use crate::sim::{AppState, Game, GameSettings};

const GAME_FONT: &str = "game";
const SCORE_SIZE: f32 = 32.0;
const BANNER_SIZE: f32 = 64.0;

pub struct UiPlugin;
impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin).add_systems(
            Update,
            (
                install_font.run_if(resource_exists::<FontBytes>),
                score_hud.run_if(resource_exists::<Game>),
                game_over_banner.run_if(in_state(AppState::GameOver)),
            )
                .chain(),
        );
    }
}

fn install_font(mut commands: Commands, mut contexts: EguiContexts, font: Res<FontBytes>) {
    let mut fonts = FontDefinitions::default();
    fonts
        .font_data
        .insert(GAME_FONT.to_owned(), FontData::from_owned(font.0.clone()));
    fonts
        .families
        .entry(FontFamily::Proportional)
        .or_default()
        .insert(0, GAME_FONT.to_owned());
    contexts.ctx_mut().set_fonts(fonts);
    commands.remove_resource::<FontBytes>();
}

fn score_hud(mut contexts: EguiContexts, game: Res<Game>, settings: Res<GameSettings>) {
    let pos = settings.score_pos;
    egui::Area::new("score".into())
        .fixed_pos(egui::pos2(pos.x, pos.y))
        .show(contexts.ctx_mut(), |ui| {
            let text = RichText::new(format!("Missed Shots: {}", game.missed_shots))
                .font(FontId::proportional(SCORE_SIZE))
                .color(Color32::BLACK);
            ui.add(egui::Label::new(text).wrap_mode(egui::TextWrapMode::Extend));
        });
}

fn game_over_banner(mut contexts: EguiContexts) {
    egui::Area::new("game_over".into())
        .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(contexts.ctx_mut(), |ui| {
            let text = RichText::new("GAME OVER")
                .font(FontId::proportional(BANNER_SIZE))
                .color(Color32::BLACK);
            ui.add(egui::Label::new(text).wrap_mode(egui::TextWrapMode::Extend));
        });
}
