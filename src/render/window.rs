use std::time::Duration;

use raylib::prelude::*;
use tracing::info;

use crate::app::AppContext;
use crate::constants::*;
use crate::letter::{LetterRevealer, LetterSheet};
use crate::render::wrap;
use crate::slide::CardPhase;
use crate::slideshow::{SlideDeck, SlideSequencer};

const BACKGROUND: Color = Color::new(253, 246, 240, 255);
const INK: Color = Color::new(92, 64, 81, 255);
const ACCENT: Color = Color::new(232, 121, 160, 255);

const SLIDE_FONT: i32 = 56;
const LETTER_FONT: i32 = 24;
const LINE_GAP: i32 = 8;

// The default raylib font is roughly this wide per character, relative to its size.
fn text_width(text: &str, size: i32) -> i32 {
    text.chars().count() as i32 * size * 11 / 20
}

fn faded(color: Color, opacity: f32) -> Color {
    Color::new(color.r, color.g, color.b, (opacity.clamp(0.0, 1.0) * 255.0) as u8)
}

fn draw_slides(d: &mut RaylibDrawHandle, slides: &SlideSequencer<SlideDeck>) {
    let deck = slides.surface();
    if !deck.visible {
        return;
    }
    for card in deck.cards().iter().filter(|card| card.phase != CardPhase::Hidden) {
        let size = (SLIDE_FONT as f32 * card.scale()) as i32;
        let x = (RENDER_WIDTH - text_width(&card.text, size)) / 2;
        let y = RENDER_HEIGHT / 2 - size / 2 + (card.offset() * RENDER_HEIGHT as f32) as i32;
        d.draw_text(&card.text, x, y, size, faded(INK, card.opacity()));
    }
    if let Some(fraction) = deck.progress() {
        let width = (RENDER_WIDTH as f32 * fraction) as i32;
        d.draw_rectangle(0, RENDER_HEIGHT - 6, width, 6, ACCENT);
    }
}

fn draw_letter(d: &mut RaylibDrawHandle, letter: &LetterRevealer<LetterSheet>) {
    let sheet = letter.surface();
    if sheet.visible {
        let area = sheet.area();
        let ink = faded(INK, sheet.opacity());
        let columns = (area.width as i32 / (LETTER_FONT * 11 / 20)).max(1) as usize;
        let mut y = area.y as i32;

        for view in sheet.paragraphs() {
            let opacity = view.opacity.unwrap_or(0.0) * sheet.opacity();
            for line in wrap(&view.text, columns) {
                d.draw_text(&line, area.x as i32, y, LETTER_FONT, faded(INK, opacity));
                y += LETTER_FONT + LINE_GAP;
            }
            y += LETTER_FONT;
        }

        let signature = sheet.signature();
        let x = (area.x + area.width) as i32 - text_width(&signature.closing, LETTER_FONT);
        if signature.closing_shown {
            d.draw_text(&signature.closing, x, y, LETTER_FONT, ink);
        }
        y += LETTER_FONT + LINE_GAP;
        if signature.name_shown {
            d.draw_text(&signature.name, x, y, LETTER_FONT, ink);
        }
        if signature.mark_shown {
            let mark_x = x + text_width(&signature.name, LETTER_FONT) + LETTER_FONT;
            d.draw_circle(mark_x, y + LETTER_FONT / 2, LETTER_FONT as f32 / 3.0, ACCENT);
        }
    }

    // The default font has no heart glyph, so particles are drawn as soft dots.
    if let Some(field) = letter.particles() {
        for particle in field.particles() {
            let [r, g, b] = particle.color;
            let color = faded(Color::new(r, g, b, 255), particle.opacity());
            d.draw_circle(particle.x as i32, particle.y as i32, particle.size / 2.0, color);
        }
    }
}

/// Opens the window and drives `app` until it is closed.
pub fn run(mut app: AppContext) -> anyhow::Result<()> {
    let (mut rl, thread) = raylib::init()
        .size(RENDER_WIDTH, RENDER_HEIGHT)
        .title("Greeting")
        .vsync()
        .build();
    rl.set_target_fps(FPS);
    rl.set_trace_log(TraceLogLevel::LOG_ERROR);
    info!(width = RENDER_WIDTH, height = RENDER_HEIGHT, "window open");

    while !rl.window_should_close() {
        if rl.is_key_pressed(KeyboardKey::KEY_SPACE) {
            let paused = app.toggle_pause();
            info!(paused, "pause toggled");
        }
        if rl.is_key_pressed(KeyboardKey::KEY_RIGHT) {
            app.next();
        }
        if rl.is_key_pressed(KeyboardKey::KEY_S) {
            app.skip();
        }
        if rl.is_key_pressed(KeyboardKey::KEY_P) {
            app.toggle_particles();
        }
        if rl.is_key_pressed(KeyboardKey::KEY_R) {
            app.replay();
        }
        if rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT) {
            let position = rl.get_mouse_position();
            app.pointer(position.x, position.y);
        }

        app.update(Duration::from_secs_f32(rl.get_frame_time()));

        let mut d = rl.begin_drawing(&thread);
        d.clear_background(BACKGROUND);
        if let Some(slides) = app.slides() {
            draw_slides(&mut d, slides);
        }
        if let Some(letter) = app.letter() {
            draw_letter(&mut d, letter);
        }
    }
    info!("window closed");
    Ok(())
}
